//! Quiet Room Core - Viewer geometry library
//!
//! This crate provides the geometry behind the Quiet Room reference viewer:
//! fitting a rotated image into its container, mapping crop rectangles
//! between the rotated stage and the original image, and the interactive
//! crop and rotation tool.

pub mod crop;
pub mod geometry;
pub mod session;
pub mod transform;

pub use crop::{
    AspectMode, CropError, CropPhase, CropTool, CropToolConfig, CustomAspect, RotationChange,
    ViewerPort, MIN_CROP_SIZE,
};
pub use geometry::{NormalizedRect, Point, Size};
pub use session::ViewerSession;
pub use transform::{
    compute_stage_layout, image_rect_to_stage_crop, stage_to_image_rect, Rotation, StageLayout,
};
