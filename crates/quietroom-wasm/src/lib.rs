//! Quiet Room WASM - WebAssembly bindings for the viewer geometry
//!
//! This crate provides WASM bindings to expose the quietroom-core layout,
//! crop mapping and crop tool to the TypeScript frontend.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types and rectangle conversion
//! - `transform` - Stage layout and crop mapping functions
//! - `crop_tool` - The interactive crop tool class
//!
//! # Usage
//!
//! ```typescript
//! import init, { compute_stage_layout, JsCropTool } from '@quietroom/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const layout = compute_stage_layout(400, 300, img.naturalWidth, img.naturalHeight, 90);
//! console.log(`Stage ${layout.stageW}x${layout.stageH}`);
//! ```

use wasm_bindgen::prelude::*;

mod crop_tool;
mod transform;
mod types;

// Re-export public types
pub use crop_tool::JsCropTool;
pub use transform::{
    aspect_modes, compute_stage_layout, crop_clip_path, effective_aspect_label,
    image_rect_to_stage_crop, map_stage_point, stage_to_image_rect, validate_crop,
};
pub use types::JsStageLayout;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
