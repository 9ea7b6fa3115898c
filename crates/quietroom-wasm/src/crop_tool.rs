//! Crop tool WASM bindings.
//!
//! `JsCropTool` owns a core [`CropTool`] whose port forwards every change to
//! JavaScript callbacks. Pointer events are passed in client coordinates;
//! the stage bounds come from `getBoundingClientRect()`.
//!
//! # Usage
//!
//! ```typescript
//! const tool = new JsCropTool(reference.id, undefined);
//! tool.on_crop_change((id, crop) => store.setCrop(id, crop));
//! tool.on_rotation_change((id, degrees, change) => store.setRotation(id, degrees, change));
//! tool.set_natural_size(img.naturalWidth, img.naturalHeight);
//! tool.toggle();
//! tool.set_overlay_box_from_rect(stage.getBoundingClientRect());
//! ```

use crate::transform::clip_path;
use crate::types::{optional_rect_from_js, rect_to_js, JsStageLayout};
use js_sys::Function;
use quietroom_core::crop::{CropTool, CropToolConfig, CustomAspect, ScreenRect};
use quietroom_core::{AspectMode, NormalizedRect, Rotation, RotationChange, Size, ViewerPort};
use wasm_bindgen::prelude::*;

/// Port that calls back into JavaScript.
///
/// Callbacks are optional; events without a listener are dropped. A throwing
/// callback is reported to the console and does not affect the tool.
#[derive(Debug, Default)]
pub(crate) struct JsPort {
    on_crop: Option<Function>,
    on_rotation: Option<Function>,
    on_crop_mode: Option<Function>,
}

fn report(result: Result<JsValue, JsValue>, message: &str) {
    if let Err(err) = result {
        web_sys::console::error_2(&JsValue::from_str(message), &err);
    }
}

impl ViewerPort for JsPort {
    fn crop_changed(&mut self, id: &str, crop: Option<NormalizedRect>) {
        let Some(callback) = &self.on_crop else {
            return;
        };
        let result = rect_to_js(crop)
            .and_then(|crop| callback.call2(&JsValue::NULL, &JsValue::from_str(id), &crop));
        report(result, "crop change callback failed");
    }

    fn rotation_changed(&mut self, id: &str, rotation: Rotation, change: RotationChange) {
        let Some(callback) = &self.on_rotation else {
            return;
        };
        let change = match change {
            RotationChange::Preview => "preview",
            RotationChange::Commit => "commit",
        };
        let result = callback.call3(
            &JsValue::NULL,
            &JsValue::from_str(id),
            &JsValue::from(rotation.degrees()),
            &JsValue::from_str(change),
        );
        report(result, "rotation change callback failed");
    }

    fn crop_mode_changed(&mut self, enabled: bool) {
        let Some(callback) = &self.on_crop_mode else {
            return;
        };
        let result = callback.call1(&JsValue::NULL, &JsValue::from_bool(enabled));
        report(result, "crop mode callback failed");
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Interactive crop and rotation tool for one viewer.
#[wasm_bindgen]
pub struct JsCropTool {
    inner: CropTool<JsPort>,
}

#[wasm_bindgen]
impl JsCropTool {
    /// Create a tool for the image `id`.
    ///
    /// `config` is an optional partial `CropToolConfig` object; missing
    /// fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(id: String, config: JsValue) -> Result<JsCropTool, JsValue> {
        let config = if config.is_null() || config.is_undefined() {
            CropToolConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid crop tool config: {}", e)))?
        };
        Ok(Self::with_config(id, config))
    }

    /// Listener for `(id, crop | null)`
    pub fn on_crop_change(&mut self, callback: Function) {
        self.inner.port_mut().on_crop = Some(callback);
    }

    /// Listener for `(id, degrees, "preview" | "commit")`
    pub fn on_rotation_change(&mut self, callback: Function) {
        self.inner.port_mut().on_rotation = Some(callback);
    }

    /// Listener for `(enabled)`
    pub fn on_crop_mode_change(&mut self, callback: Function) {
        self.inner.port_mut().on_crop_mode = Some(callback);
    }

    /// Switch to another image with its persisted rotation and crop.
    pub fn load(&mut self, id: String, rotation: i32, crop: JsValue) -> Result<(), JsValue> {
        let crop = optional_rect_from_js(crop)?;
        self.inner.load(id, Rotation::from_degrees(rotation), crop);
        Ok(())
    }

    pub fn set_container_size(&mut self, w: f64, h: f64) {
        self.inner.set_container_size(Size::new(w, h));
    }

    pub fn set_natural_size(&mut self, w: f64, h: f64) {
        self.inner.set_natural_size(Size::new(w, h));
    }

    /// Layout at the displayed rotation
    pub fn layout(&self) -> JsStageLayout {
        self.inner.layout().into()
    }

    /// Record the stage's on-screen bounds
    pub fn set_overlay_box(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.inner
            .set_overlay_box(Some(ScreenRect::new(left, top, width, height)));
    }

    /// Record the stage's bounds from `getBoundingClientRect()`
    pub fn set_overlay_box_from_rect(&mut self, rect: &web_sys::DomRect) {
        self.set_overlay_box(rect.left(), rect.top(), rect.width(), rect.height());
    }

    pub fn clear_overlay_box(&mut self) {
        self.inner.set_overlay_box(None);
    }

    // =========================================================================
    // Mode
    // =========================================================================

    pub fn toggle(&mut self) {
        self.inner.toggle();
    }

    pub fn enter(&mut self) {
        self.inner.enter();
    }

    pub fn cancel(&mut self) {
        self.inner.cancel();
    }

    /// Returns true when Escape was consumed by the tool
    pub fn escape(&mut self) -> bool {
        self.inner.escape()
    }

    /// Commit the draft. Throws outside crop mode or for an undersized draft.
    pub fn apply(&mut self) -> Result<(), JsValue> {
        self.inner.apply().map(|_| ()).map_err(to_js_error)
    }

    pub fn restore(&mut self) {
        self.inner.restore();
    }

    #[wasm_bindgen(getter)]
    pub fn is_cropping(&self) -> bool {
        self.inner.is_cropping()
    }

    /// `"idle"`, `"cropping"`, `"dragging_new"`, `"moving"` or `"resizing_corner"`
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.inner.phase().as_str().to_string()
    }

    /// Draft rectangle while cropping, else `null`
    pub fn draft(&self) -> Result<JsValue, JsValue> {
        rect_to_js(self.inner.draft())
    }

    /// Committed crop, else `null`
    pub fn crop(&self) -> Result<JsValue, JsValue> {
        rect_to_js(self.inner.crop())
    }

    /// CSS `clip-path` for the committed crop, hidden while cropping
    pub fn clip_path(&self) -> Option<String> {
        if self.inner.is_cropping() {
            return None;
        }
        self.inner.crop().and_then(|crop| clip_path(&crop))
    }

    /// Aspect label of the visible canvas, e.g. `"1.50:1"`
    pub fn effective_aspect_label(&self) -> Option<String> {
        self.inner.effective_aspect_label()
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    /// Returns the phase the press started
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) -> String {
        self.inner.pointer_down(client_x, client_y).as_str().to_string()
    }

    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) {
        self.inner.pointer_move(client_x, client_y);
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    // =========================================================================
    // Aspect
    // =========================================================================

    /// Select an aspect mode by id, e.g. `"square"`
    pub fn set_aspect_mode(&mut self, id: &str) -> Result<(), JsValue> {
        let mode: AspectMode = id.parse().map_err(to_js_error)?;
        self.inner.set_aspect_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn aspect_mode(&self) -> String {
        self.inner.aspect_mode().as_str().to_string()
    }

    /// Update the custom ratio fields. Returns false while they do not hold
    /// a valid ratio.
    pub fn set_custom_aspect(&mut self, width: &str, height: &str) -> bool {
        let custom = CustomAspect::parse(width, height).ok();
        self.inner.set_custom_aspect(custom);
        custom.is_some()
    }

    /// The custom ratio fields lost focus
    pub fn commit_custom_aspect(&mut self) {
        self.inner.commit_custom_aspect();
    }

    // =========================================================================
    // Rotation
    // =========================================================================

    /// Displayed rotation in `[0, 360)`
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> i32 {
        self.inner.rotation().degrees()
    }

    /// Slider value in `[-180, 180]`
    #[wasm_bindgen(getter)]
    pub fn rotation_signed(&self) -> i32 {
        self.inner.rotation_control().signed()
    }

    /// Text of the rotation number input
    #[wasm_bindgen(getter)]
    pub fn rotation_input(&self) -> String {
        self.inner.rotation_control().input().to_string()
    }

    pub fn rotate_right(&mut self) {
        self.inner.rotate_right();
    }

    /// Follow a rotation persisted elsewhere, without emitting events
    pub fn sync_rotation(&mut self, degrees: i32) {
        self.inner.sync_rotation(Rotation::from_degrees(degrees));
    }

    pub fn slider_pointer_down(&mut self) {
        self.inner.slider_pointer_down();
    }

    pub fn slider_changed(&mut self, signed: i32) {
        self.inner.slider_changed(signed);
    }

    pub fn slider_pointer_up(&mut self) {
        self.inner.slider_pointer_up();
    }

    pub fn rotation_input_focused(&mut self) {
        self.inner.rotation_input_focused();
    }

    pub fn rotation_input_changed(&mut self, text: &str) {
        self.inner.rotation_input_changed(text);
    }

    /// Blur or Enter on the rotation input
    pub fn rotation_input_committed(&mut self) {
        self.inner.rotation_input_committed();
    }
}

impl JsCropTool {
    pub(crate) fn with_config(id: String, config: CropToolConfig) -> Self {
        Self {
            inner: CropTool::new(id, JsPort::default(), config),
        }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &CropTool<JsPort> {
        &self.inner
    }
}
