//! Stage layout: fitting a rotated image into a fixed container.
//!
//! The "stage" is the axis-aligned bounding box of the displayed image after
//! rotation. The viewer centers the stage in its container and rotates the
//! image inside it, so both boxes must be known to place the image and to
//! interpret screen-aligned crop rectangles.
//!
//! # Algorithm
//!
//! Fitting happens in two passes:
//! 1. Shrink the natural size to fit the container (never upscale)
//! 2. Rotate, and if the rotated bounding box overflows the container,
//!    shrink everything again by the overflow factor
//!
//! A single pass is not enough: a rectangle that exactly fits its container
//! can overflow once rotated. The second pass corrects that without search.

use serde::{Deserialize, Serialize};

use super::rotation::{rotated_bounds, Rotation};
use crate::geometry::{NormalizedRect, Size};

/// Rendered image size and rotated stage size, in container pixels.
///
/// All four values are zero when the layout cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLayout {
    /// Rendered image width before rotation
    pub img_w: f64,
    /// Rendered image height before rotation
    pub img_h: f64,
    /// Width of the rotated bounding box
    pub stage_w: f64,
    /// Height of the rotated bounding box
    pub stage_h: f64,
}

impl StageLayout {
    /// The empty layout returned for degenerate input.
    pub const EMPTY: StageLayout = StageLayout {
        img_w: 0.0,
        img_h: 0.0,
        stage_w: 0.0,
        stage_h: 0.0,
    };

    /// Compute the layout; see [`compute_stage_layout`].
    pub fn compute(container: Size, natural: Size, rotation_deg: f64) -> Self {
        compute_stage_layout(container, natural, rotation_deg)
    }

    /// True when any dimension is non-positive.
    pub fn is_empty(&self) -> bool {
        !(self.img_w > 0.0 && self.img_h > 0.0 && self.stage_w > 0.0 && self.stage_h > 0.0)
    }

    pub fn img_size(&self) -> Size {
        Size::new(self.img_w, self.img_h)
    }

    pub fn stage_size(&self) -> Size {
        Size::new(self.stage_w, self.stage_h)
    }

    /// `stage_h / stage_w`, the factor that turns a pixel aspect ratio into a
    /// ratio of stage fractions.
    pub fn distortion(&self) -> Option<f64> {
        if self.stage_w > 0.0 && self.stage_h > 0.0 {
            Some(self.stage_h / self.stage_w)
        } else {
            None
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            img_w: self.img_w * factor,
            img_h: self.img_h * factor,
            stage_w: self.stage_w * factor,
            stage_h: self.stage_h * factor,
        }
    }
}

/// Compute the largest image rectangle whose rotated bounding box still fits
/// `container`.
///
/// # Arguments
///
/// * `container` - Available viewport size in pixels
/// * `natural` - Intrinsic image size in pixels
/// * `rotation_deg` - Display rotation in degrees
///
/// # Behavior
///
/// - Images are shrunk to fit, never upscaled
/// - Any non-positive input dimension yields [`StageLayout::EMPTY`]
/// - At 0° the stage equals the image; at 90°/270° its sides are swapped
///
/// # Example
///
/// ```
/// use quietroom_core::geometry::Size;
/// use quietroom_core::transform::compute_stage_layout;
///
/// let layout = compute_stage_layout(Size::new(400.0, 300.0), Size::new(800.0, 400.0), 90.0);
/// assert!((layout.img_w - 300.0).abs() < 1e-9);
/// assert!((layout.stage_h - 300.0).abs() < 1e-9);
/// ```
pub fn compute_stage_layout(container: Size, natural: Size, rotation_deg: f64) -> StageLayout {
    let (cw, ch) = (container.w, container.h);
    let (nw, nh) = (natural.w, natural.h);
    if !(cw > 0.0 && ch > 0.0 && nw > 0.0 && nh > 0.0) {
        return StageLayout::EMPTY;
    }

    let base_scale = 1f64.min(cw / nw).min(ch / nh);
    let img_w = nw * base_scale;
    let img_h = nh * base_scale;
    if !(img_w > 0.0 && img_h > 0.0) {
        return StageLayout::EMPTY;
    }

    let (stage_w, stage_h) = rotated_bounds(img_w, img_h, rotation_deg);
    if !(stage_w > 0.0 && stage_h > 0.0) {
        return StageLayout::EMPTY;
    }

    let extra = 1f64.min(cw / stage_w).min(ch / stage_h);
    StageLayout {
        img_w,
        img_h,
        stage_w,
        stage_h,
    }
    .scaled(extra)
}

/// Pixel size of the canvas the user is working on.
///
/// This is the rotated bounding box of the natural size, reduced to the crop
/// when one is set (the crop lives in stage space), with width and height
/// swapped at 90°/270° to match what the user sees.
pub fn effective_natural_size(
    natural: Size,
    rotation: Rotation,
    crop: Option<NormalizedRect>,
) -> Size {
    if !natural.is_measured() {
        return natural;
    }
    let (mut w, mut h) = rotated_bounds(natural.w, natural.h, rotation.as_f64());
    if let Some(c) = crop.and_then(NormalizedRect::sanitized) {
        w *= c.w;
        h *= c.h;
    }
    if rotation.swaps_dimensions() {
        Size::new(h, w)
    } else {
        Size::new(w, h)
    }
}

/// Human-readable aspect ratio such as `"1.78:1"` or `"1:1.50"`.
pub fn aspect_label(size: Size) -> Option<String> {
    let ratio = size.aspect()?;
    if !ratio.is_finite() {
        return None;
    }
    if ratio >= 1.0 {
        Some(format!("{:.2}:1", ratio))
    } else {
        Some(format!("1:{:.2}", 1.0 / ratio))
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
