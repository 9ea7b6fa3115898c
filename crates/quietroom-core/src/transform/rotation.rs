//! Rotation angles and rotated bounding boxes.
//!
//! Rotations are persisted as integer degrees normalized to `[0, 360)`.
//! Editing controls work with a signed `[-180, 180]` representation so that a
//! slider centered on zero can reach both directions.
//!
//! # Algorithm
//!
//! The bounding box of a `w × h` rectangle rotated by θ about its center is:
//! ```text
//! new_w = w·|cos θ| + h·|sin θ|
//! new_h = w·|sin θ| + h·|cos θ|
//! ```

use serde::{Deserialize, Serialize};

/// Lower bound of the signed editing range.
pub const SIGNED_MIN: i32 = -180;
/// Upper bound of the signed editing range.
pub const SIGNED_MAX: i32 = 180;

/// A rotation in whole degrees, normalized to `[0, 360)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Rotation(i32);

impl Rotation {
    /// No rotation.
    pub const ZERO: Rotation = Rotation(0);

    /// Normalize any degree value into `[0, 360)`.
    pub fn from_degrees(degrees: i32) -> Self {
        Self(degrees.rem_euclid(360))
    }

    /// Build a rotation from the signed editing representation.
    pub fn from_signed(signed: i32) -> Self {
        Self::from_degrees(signed)
    }

    /// Degrees in `[0, 360)`.
    #[inline]
    pub fn degrees(self) -> i32 {
        self.0
    }

    /// Degrees as `f64`, for the layout and mapping functions.
    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Signed degrees in `(-180, 180]`.
    pub fn signed(self) -> i32 {
        if self.0 > 180 {
            self.0 - 360
        } else {
            self.0
        }
    }

    /// Rotate a quarter turn clockwise.
    pub fn rotate_right(self) -> Self {
        Self::from_degrees(self.0 + 90)
    }

    /// True for 90° and 270°, where perceived width and height swap.
    pub fn swaps_dimensions(self) -> bool {
        self.0 == 90 || self.0 == 270
    }
}

impl From<i32> for Rotation {
    fn from(value: i32) -> Self {
        Rotation::from_degrees(value)
    }
}

impl From<Rotation> for i32 {
    fn from(value: Rotation) -> Self {
        value.0
    }
}

/// Round and clamp a user-entered value into the signed editing range.
///
/// Non-finite values map to 0.
pub fn clamp_signed(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    // Range-limited before the cast, so the conversion is exact.
    value
        .round()
        .clamp(f64::from(SIGNED_MIN), f64::from(SIGNED_MAX)) as i32
}

/// Parse the text of a rotation input field.
///
/// Blank input is treated as 0, matching how numeric fields coerce an empty
/// string. Anything that is not a finite number yields `None`.
pub fn parse_degrees(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Compute the bounding box of a `width × height` rectangle rotated by
/// `angle_degrees` about its center.
///
/// Unlike a pixel canvas this keeps fractional sizes; callers that need whole
/// pixels round the result themselves.
///
/// # Example
///
/// ```
/// use quietroom_core::transform::rotated_bounds;
///
/// let (w, h) = rotated_bounds(100.0, 50.0, 90.0);
/// assert!((w - 50.0).abs() < 1e-9);
/// assert!((h - 100.0).abs() < 1e-9);
/// ```
pub fn rotated_bounds(width: f64, height: f64, angle_degrees: f64) -> (f64, f64) {
    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    (width * cos + height * sin, width * sin + height * cos)
}
