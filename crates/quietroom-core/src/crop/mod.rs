//! Interactive crop and rotation tool.
//!
//! This module provides:
//! - The [`CropTool`] state machine (enter, drag, move, resize, apply, cancel)
//! - Aspect-ratio modes and the custom ratio editor
//! - The synchronized rotation slider and number input
//! - [`ViewerPort`], the callbacks the tool reports persisted changes through
//!
//! # Coordinate System
//!
//! - The draft and committed crop are normalized stage-space rectangles
//! - Pointer positions arrive in client pixels and are converted through the
//!   measured overlay box (the stage's on-screen bounds)

mod aspect;
mod config;
mod port;
mod rotation_control;
mod tool;

use thiserror::Error;

pub use aspect::{refit_centered, AspectMode, CustomAspect};
pub use config::CropToolConfig;
pub use port::{NullPort, PortEvent, RecordingPort, RotationChange, ViewerPort};
pub use rotation_control::{RotationControl, RotationIntent};
pub use tool::{Corner, CropPhase, CropTool, ScreenRect};

/// Smallest width/height a committed crop may have, as a stage fraction.
pub const MIN_CROP_SIZE: f64 = 0.03;

/// Error types for crop operations.
#[derive(Debug, Error)]
pub enum CropError {
    /// Width or height is zero, negative or not a number.
    #[error("Crop width/height must be > 0 (got {w}x{h})")]
    EmptyRect { w: f64, h: f64 },

    /// The top-left corner lies outside the unit square.
    #[error("Crop x/y must be within [0, 1] (got {x}, {y})")]
    OriginOutOfRange { x: f64, y: f64 },

    /// The rectangle extends past the right or bottom edge.
    #[error("Crop rectangle must fit within [0, 1] (right {right}, bottom {bottom})")]
    ExceedsBounds { right: f64, bottom: f64 },

    /// An aspect mode identifier was not recognized.
    #[error("Unknown aspect mode: {0}")]
    UnknownAspectMode(String),

    /// The custom ratio fields do not hold two positive numbers.
    #[error("Invalid custom aspect ratio: {0}")]
    InvalidCustomAspect(String),

    /// Apply was requested outside crop mode.
    #[error("Crop mode is not active")]
    NotCropping,

    /// The draft is below the minimum crop size.
    #[error("Crop {w}x{h} is smaller than the minimum size {min}")]
    DraftTooSmall { w: f64, h: f64, min: f64 },
}
