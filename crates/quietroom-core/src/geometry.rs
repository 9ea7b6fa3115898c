//! Value types shared by the layout, mapping and crop modules.
//!
//! # Coordinate System
//!
//! - Pixel sizes are `f64` so fitted/rotated sizes keep sub-pixel precision
//! - Rectangles are normalized (0.0 to 1.0) relative to the space they are
//!   declared in: stage space or image space
//! - Origin is top-left corner

use serde::{Deserialize, Serialize};

use crate::crop::CropError;

/// Slack allowed on the right/bottom edge when validating a persisted crop.
const EDGE_TOLERANCE: f64 = 1e-5;

/// Pixel dimensions. `(0, 0)` means "not measured yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    /// The unknown/unmeasured size.
    pub const ZERO: Size = Size { w: 0.0, h: 0.0 };

    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// True when both dimensions are strictly positive.
    #[inline]
    pub fn is_measured(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Width over height, or `None` for an unmeasured size.
    pub fn aspect(&self) -> Option<f64> {
        if self.is_measured() {
            Some(self.w / self.h)
        } else {
            None
        }
    }
}

/// A point in normalized (0.0 to 1.0) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in normalized coordinates.
///
/// The same type is used for stage-space and image-space rectangles; the two
/// are only interchangeable through the functions in
/// [`transform`](crate::transform).
///
/// Serialized as `{ "x", "y", "w", "h" }`, the persisted crop format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Default for NormalizedRect {
    fn default() -> Self {
        Self::FULL
    }
}

impl NormalizedRect {
    /// The whole space.
    pub const FULL: NormalizedRect = NormalizedRect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build the rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            w: a.x.max(b.x) - x,
            h: a.y.max(b.y) - y,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.x, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    /// True when both dimensions are strictly positive.
    #[inline]
    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Axis-aligned bounding box of `points`, clamped to `[0, 1]`.
    ///
    /// Returns `None` when the clamped box has no area (including non-finite
    /// input, which fails every comparison).
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let min_x = min_x.max(0.0);
        let max_x = max_x.min(1.0);
        let min_y = min_y.max(0.0);
        let max_y = max_y.min(1.0);

        if !(max_x > min_x && max_y > min_y) {
            return None;
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Clamp sizes into `[min_size, 1]` and then slide the rectangle so it
    /// stays inside the unit square.
    pub fn clamped(self, min_size: f64) -> Self {
        let w = self.w.min(1.0).max(min_size);
        let h = self.h.min(1.0).max(min_size);
        Self {
            x: self.x.min(1.0 - w).max(0.0),
            y: self.y.min(1.0 - h).max(0.0),
            w,
            h,
        }
    }

    /// Clip a stored crop into the unit square without enforcing a minimum
    /// size. Returns `None` if nothing is left.
    pub fn sanitized(self) -> Option<Self> {
        if !self.has_area() {
            return None;
        }
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        let w = self.w.min(1.0 - x).max(0.0);
        let h = self.h.min(1.0 - y).max(0.0);
        let rect = Self::new(x, y, w, h);
        rect.has_area().then_some(rect)
    }

    /// Percent insets `(top, right, bottom, left)` that clip the stage down
    /// to this rectangle, as used by a CSS `inset()` clip path.
    pub fn clip_insets(&self) -> Option<[f64; 4]> {
        let r = self.sanitized()?;
        Some([
            r.y * 100.0,
            (1.0 - r.x - r.w) * 100.0,
            (1.0 - r.y - r.h) * 100.0,
            r.x * 100.0,
        ])
    }

    /// True when the rectangle may be committed as a crop.
    pub fn is_committable(&self, min_size: f64) -> bool {
        self.w >= min_size && self.h >= min_size
    }

    /// Check the rules a persisted crop must satisfy.
    pub fn validate(self) -> Result<Self, CropError> {
        if !(self.w > 0.0 && self.h > 0.0) {
            return Err(CropError::EmptyRect {
                w: self.w,
                h: self.h,
            });
        }
        if !(self.x >= 0.0 && self.y >= 0.0 && self.x <= 1.0 && self.y <= 1.0) {
            return Err(CropError::OriginOutOfRange {
                x: self.x,
                y: self.y,
            });
        }
        if self.right() > 1.0 + EDGE_TOLERANCE || self.bottom() > 1.0 + EDGE_TOLERANCE {
            return Err(CropError::ExceedsBounds {
                right: self.right(),
                bottom: self.bottom(),
            });
        }
        Ok(self)
    }

    /// Approximate equality, used to avoid redundant draft updates.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
            && (self.h - other.h).abs() < epsilon
    }
}
