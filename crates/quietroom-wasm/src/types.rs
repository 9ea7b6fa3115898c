//! WASM-compatible wrapper types for viewer geometry.
//!
//! Rectangles cross the boundary as plain `{ x, y, w, h }` objects through
//! `serde_wasm_bindgen`; the stage layout is a class with getters so it can
//! be handed back to the mapping functions without re-serializing.

use quietroom_core::{NormalizedRect, StageLayout};
use wasm_bindgen::prelude::*;

/// Fitted image and stage dimensions for JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsStageLayout {
    inner: StageLayout,
}

#[wasm_bindgen]
impl JsStageLayout {
    /// Width of the unrotated image after fitting
    #[wasm_bindgen(getter, js_name = imgW)]
    pub fn img_w(&self) -> f64 {
        self.inner.img_w
    }

    /// Height of the unrotated image after fitting
    #[wasm_bindgen(getter, js_name = imgH)]
    pub fn img_h(&self) -> f64 {
        self.inner.img_h
    }

    /// Width of the rotated bounding box
    #[wasm_bindgen(getter, js_name = stageW)]
    pub fn stage_w(&self) -> f64 {
        self.inner.stage_w
    }

    /// Height of the rotated bounding box
    #[wasm_bindgen(getter, js_name = stageH)]
    pub fn stage_h(&self) -> f64 {
        self.inner.stage_h
    }

    /// True until both the container and the image have been measured
    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Serialize as `{ imgW, imgH, stageW, stageH }`
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl From<StageLayout> for JsStageLayout {
    fn from(inner: StageLayout) -> Self {
        Self { inner }
    }
}

impl JsStageLayout {
    pub(crate) fn inner(&self) -> &StageLayout {
        &self.inner
    }
}

/// Read a `{ x, y, w, h }` object.
pub(crate) fn rect_from_js(value: JsValue) -> Result<NormalizedRect, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid rectangle: {}", e)))
}

/// Read an optional rectangle; `null` and `undefined` mean "no crop".
pub(crate) fn optional_rect_from_js(value: JsValue) -> Result<Option<NormalizedRect>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    rect_from_js(value).map(Some)
}

/// Write a rectangle, or `null` when there is none.
pub(crate) fn rect_to_js(rect: Option<NormalizedRect>) -> Result<JsValue, JsValue> {
    match rect {
        Some(rect) => {
            serde_wasm_bindgen::to_value(&rect).map_err(|e| JsValue::from_str(&e.to_string()))
        }
        None => Ok(JsValue::NULL),
    }
}
