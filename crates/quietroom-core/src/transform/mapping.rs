//! Mapping crop rectangles between stage space and image space.
//!
//! Crops are edited in stage space (screen-aligned, after rotation) but the
//! image underneath is rotated, so a crop has to be re-expressed in image
//! space whenever the rotation changes.
//!
//! # Algorithm
//!
//! Each corner of the rectangle is moved to pixel coordinates centered on the
//! image, rotated, moved back to fractions of the target space, and the
//! result is the axis-aligned bounding box of the four mapped corners:
//! ```text
//! (ix, iy) = ((nx - 0.5) * img_w, (ny - 0.5) * img_h)
//! (sx, sy) = (ix * cos θ - iy * sin θ, ix * sin θ + iy * cos θ)
//! (nx', ny') = ((sx + stage_w / 2) / stage_w, (sy + stage_h / 2) / stage_h)
//! ```
//!
//! The bounding box over-includes area at angles that are not multiples of
//! 90°. Crops stay axis-aligned rectangles; they never become quadrilaterals.

use super::layout::StageLayout;
use crate::geometry::{NormalizedRect, Point};

/// Map an image-space rectangle onto the rotated stage.
///
/// Returns `None` when the layout is empty or the mapped box collapses after
/// clamping to `[0, 1]`; callers keep their previous crop in that case.
pub fn image_rect_to_stage_crop(
    rect: NormalizedRect,
    rotation_deg: f64,
    layout: &StageLayout,
) -> Option<NormalizedRect> {
    if layout.is_empty() {
        return None;
    }
    let theta = rotation_deg.rem_euclid(360.0).to_radians();
    map_rect(
        rect,
        theta,
        (layout.img_w, layout.img_h),
        (layout.stage_w, layout.stage_h),
    )
}

/// Map a stage-space crop back onto the unrotated image.
///
/// Inverse of [`image_rect_to_stage_crop`], up to the bounding-box
/// approximation.
pub fn stage_to_image_rect(
    rect: NormalizedRect,
    rotation_deg: f64,
    layout: &StageLayout,
) -> Option<NormalizedRect> {
    if layout.is_empty() {
        return None;
    }
    let theta = -rotation_deg.rem_euclid(360.0).to_radians();
    map_rect(
        rect,
        theta,
        (layout.stage_w, layout.stage_h),
        (layout.img_w, layout.img_h),
    )
}

/// Map a single stage-space point into image fractions.
///
/// The result is not clamped; points over the stage corners that the image
/// does not cover land outside `[0, 1]`.
pub fn stage_point_to_image(
    point: Point,
    rotation_deg: f64,
    layout: &StageLayout,
) -> Option<Point> {
    if layout.is_empty() {
        return None;
    }
    let theta = -rotation_deg.rem_euclid(360.0).to_radians();
    let p = map_point(
        point,
        theta.sin(),
        theta.cos(),
        (layout.stage_w, layout.stage_h),
        (layout.img_w, layout.img_h),
    );
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}

/// Map a stage point into image fractions, refusing points hidden by a crop.
///
/// The point must lie inside the stage crop and inside the image-space
/// bounding box of that crop. Tools that sample pixels use this so they
/// cannot reveal cropped-away content.
pub fn map_stage_point_through_crop(
    point: Point,
    crop_in_stage: Option<NormalizedRect>,
    rotation_deg: f64,
    layout: &StageLayout,
) -> Option<Point> {
    let crop = crop_in_stage.and_then(NormalizedRect::sanitized);
    if let Some(c) = crop {
        if !c.contains(point) {
            return None;
        }
    }
    let mapped = stage_point_to_image(point, rotation_deg, layout)?;
    if let Some(c) = crop {
        let image_crop = stage_to_image_rect(c, rotation_deg, layout)?;
        if !image_crop.contains(mapped) {
            return None;
        }
    }
    Some(mapped)
}

/// Re-express a committed stage crop after the rotation changes.
///
/// The crop goes through image space: mapped back with the old rotation and
/// layout, then forward with the new ones. The result is clamped to
/// `[min_size, 1]` and kept inside the stage.
pub fn remap_crop_for_rotation(
    crop: NormalizedRect,
    from_rotation_deg: f64,
    from_layout: &StageLayout,
    to_rotation_deg: f64,
    to_layout: &StageLayout,
    min_size: f64,
) -> Option<NormalizedRect> {
    let image_rect = stage_to_image_rect(crop, from_rotation_deg, from_layout)?;
    let mapped = image_rect_to_stage_crop(image_rect, to_rotation_deg, to_layout)?;
    Some(mapped.clamped(min_size))
}

fn map_rect(
    rect: NormalizedRect,
    theta: f64,
    from: (f64, f64),
    to: (f64, f64),
) -> Option<NormalizedRect> {
    let (sin, cos) = theta.sin_cos();
    let mapped = rect
        .corners()
        .map(|corner| map_point(corner, sin, cos, from, to));
    NormalizedRect::enclosing(&mapped)
}

#[inline]
fn map_point(p: Point, sin: f64, cos: f64, from: (f64, f64), to: (f64, f64)) -> Point {
    let (from_w, from_h) = from;
    let (to_w, to_h) = to;
    let ux = (p.x - 0.5) * from_w;
    let uy = (p.y - 0.5) * from_h;
    let rx = ux * cos - uy * sin;
    let ry = ux * sin + uy * cos;
    Point::new((rx + to_w / 2.0) / to_w, (ry + to_h / 2.0) / to_h)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
