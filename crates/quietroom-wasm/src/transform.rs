//! WASM bindings for stage layout and crop mapping.
//!
//! This module exposes the pure geometry to JavaScript so that views which
//! do not host a crop tool (thumbnails, the pixel sampler) can still place a
//! rotated, cropped image.

use crate::types::{optional_rect_from_js, rect_from_js, rect_to_js, JsStageLayout};
use quietroom_core::transform::{self, aspect_label, effective_natural_size};
use quietroom_core::{AspectMode, NormalizedRect, Point, Rotation, Size};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Fit an image into its container at the given rotation.
///
/// # Arguments
///
/// * `container_w`, `container_h` - Available space in CSS pixels
/// * `natural_w`, `natural_h` - Intrinsic image size; zero while loading
/// * `rotation` - Clockwise rotation in degrees
///
/// # Example (TypeScript)
///
/// ```typescript
/// const layout = compute_stage_layout(400, 300, 800, 400, 90);
/// stage.style.width = `${layout.stageW}px`;
/// ```
#[wasm_bindgen]
pub fn compute_stage_layout(
    container_w: f64,
    container_h: f64,
    natural_w: f64,
    natural_h: f64,
    rotation: f64,
) -> JsStageLayout {
    transform::compute_stage_layout(
        Size::new(container_w, container_h),
        Size::new(natural_w, natural_h),
        rotation,
    )
    .into()
}

/// Map an image-space `{ x, y, w, h }` onto the rotated stage.
///
/// Returns `null` when the rectangle cannot be mapped.
#[wasm_bindgen]
pub fn image_rect_to_stage_crop(
    rect: JsValue,
    rotation: f64,
    layout: &JsStageLayout,
) -> Result<JsValue, JsValue> {
    let rect = rect_from_js(rect)?;
    rect_to_js(transform::image_rect_to_stage_crop(
        rect,
        rotation,
        layout.inner(),
    ))
}

/// Map a stage-space crop back onto the unrotated image.
///
/// Returns `null` when the rectangle cannot be mapped.
#[wasm_bindgen]
pub fn stage_to_image_rect(
    rect: JsValue,
    rotation: f64,
    layout: &JsStageLayout,
) -> Result<JsValue, JsValue> {
    let rect = rect_from_js(rect)?;
    rect_to_js(transform::stage_to_image_rect(rect, rotation, layout.inner()))
}

/// Map a stage point into image fractions, or `null` when the point is
/// hidden by the crop (or outside the image).
#[wasm_bindgen]
pub fn map_stage_point(
    x: f64,
    y: f64,
    crop: JsValue,
    rotation: f64,
    layout: &JsStageLayout,
) -> Result<JsValue, JsValue> {
    let crop = optional_rect_from_js(crop)?;
    match transform::map_stage_point_through_crop(Point::new(x, y), crop, rotation, layout.inner())
    {
        Some(p) => serde_wasm_bindgen::to_value(&p).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(JsValue::NULL),
    }
}

/// Check a persisted crop, returning it clipped to the unit square.
///
/// Throws with a description of the first violated rule.
#[wasm_bindgen]
pub fn validate_crop(rect: JsValue) -> Result<JsValue, JsValue> {
    let rect = rect_from_js(rect)?
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    rect_to_js(rect.sanitized())
}

/// CSS `clip-path` that shows only the crop, e.g. `inset(10% 20% 30% 40%)`.
#[wasm_bindgen]
pub fn crop_clip_path(crop: JsValue) -> Result<Option<String>, JsValue> {
    let crop = optional_rect_from_js(crop)?;
    Ok(crop.and_then(|c| clip_path(&c)))
}

pub(crate) fn clip_path(crop: &NormalizedRect) -> Option<String> {
    let [top, right, bottom, left] = crop.clip_insets()?;
    Some(format!("inset({}% {}% {}% {}%)", top, right, bottom, left))
}

/// Aspect ratio label of the visible canvas, e.g. `"1.50:1"`.
#[wasm_bindgen]
pub fn effective_aspect_label(
    natural_w: f64,
    natural_h: f64,
    rotation: i32,
    crop: JsValue,
) -> Result<Option<String>, JsValue> {
    let crop = optional_rect_from_js(crop)?;
    let size = effective_natural_size(
        Size::new(natural_w, natural_h),
        Rotation::from_degrees(rotation),
        crop,
    );
    Ok(aspect_label(size))
}

#[derive(Serialize)]
struct AspectModeEntry {
    id: &'static str,
    label: &'static str,
}

/// Aspect picker entries as `[{ id, label }]`, in display order.
#[wasm_bindgen]
pub fn aspect_modes() -> Result<JsValue, JsValue> {
    let entries: Vec<AspectModeEntry> = AspectMode::ALL
        .into_iter()
        .map(|mode| AspectModeEntry {
            id: mode.as_str(),
            label: mode.label(),
        })
        .collect();
    serde_wasm_bindgen::to_value(&entries).map_err(|e| JsValue::from_str(&e.to_string()))
}
