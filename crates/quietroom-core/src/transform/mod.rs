//! Rotation, stage layout and crop-rectangle mapping.
//!
//! All functions here are pure: they take sizes, angles and rectangles and
//! return new values. They are recomputed whenever the container, the natural
//! image size or the rotation changes.
//!
//! # Spaces
//!
//! - **Image space**: fractions of the unrotated original image
//! - **Stage space**: fractions of the rotated, screen-aligned bounding box
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Rectangles are normalized (0.0 to 1.0)
//! - Origin is top-left corner

mod layout;
mod mapping;
mod rotation;

pub use layout::{aspect_label, compute_stage_layout, effective_natural_size, StageLayout};
pub use mapping::{
    image_rect_to_stage_crop, map_stage_point_through_crop, remap_crop_for_rotation,
    stage_point_to_image, stage_to_image_rect,
};
pub use rotation::{
    clamp_signed, parse_degrees, rotated_bounds, Rotation, SIGNED_MAX, SIGNED_MIN,
};
