//! Aspect-ratio constraints for the crop tool.
//!
//! Ratios are expressed as `width / height` of the on-screen rectangle. The
//! draft, however, is stored in stage fractions, so every ratio is multiplied
//! by `box_h / box_w` before it is compared with `draft.w / draft.h`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CropError;
use crate::geometry::{NormalizedRect, Size};
use crate::transform::StageLayout;

/// ISO 216 paper ratio, rounded the way print shops quote it.
const A_SERIES: f64 = 1.414;

/// Selectable crop aspect modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMode {
    /// No constraint.
    #[default]
    Free,
    /// The image's own aspect ratio.
    Original,
    /// ISO paper, landscape (1.414 : 1).
    ASeriesLandscape,
    /// ISO paper, portrait (1 : 1.414).
    ASeriesPortrait,
    #[serde(rename = "canvas_portrait_4_5")]
    CanvasPortrait4x5,
    #[serde(rename = "canvas_landscape_5_4")]
    CanvasLandscape5x4,
    #[serde(rename = "canvas_classic_3_4")]
    CanvasClassic3x4,
    #[serde(rename = "canvas_classic_4_3")]
    CanvasClassic4x3,
    #[serde(rename = "print_photo_2_3")]
    PrintPhoto2x3,
    #[serde(rename = "print_photo_3_2")]
    PrintPhoto3x2,
    Square,
    /// User-entered `width : height`.
    Custom,
}

impl AspectMode {
    /// Every mode, in the order the picker lists them.
    pub const ALL: [AspectMode; 12] = [
        AspectMode::ASeriesLandscape,
        AspectMode::ASeriesPortrait,
        AspectMode::CanvasPortrait4x5,
        AspectMode::CanvasLandscape5x4,
        AspectMode::CanvasClassic3x4,
        AspectMode::CanvasClassic4x3,
        AspectMode::PrintPhoto2x3,
        AspectMode::PrintPhoto3x2,
        AspectMode::Square,
        AspectMode::Custom,
        AspectMode::Original,
        AspectMode::Free,
    ];

    /// Stable identifier, shared with the frontend and settings files.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectMode::Free => "free",
            AspectMode::Original => "original",
            AspectMode::ASeriesLandscape => "a_series_landscape",
            AspectMode::ASeriesPortrait => "a_series_portrait",
            AspectMode::CanvasPortrait4x5 => "canvas_portrait_4_5",
            AspectMode::CanvasLandscape5x4 => "canvas_landscape_5_4",
            AspectMode::CanvasClassic3x4 => "canvas_classic_3_4",
            AspectMode::CanvasClassic4x3 => "canvas_classic_4_3",
            AspectMode::PrintPhoto2x3 => "print_photo_2_3",
            AspectMode::PrintPhoto3x2 => "print_photo_3_2",
            AspectMode::Square => "square",
            AspectMode::Custom => "custom",
        }
    }

    /// Label shown in the aspect picker.
    pub fn label(self) -> &'static str {
        match self {
            AspectMode::Free => "Free crop",
            AspectMode::Original => "Original",
            AspectMode::ASeriesLandscape => "ISO Paper (A-series) 1.414 : 1",
            AspectMode::ASeriesPortrait => "ISO Paper (A-series) 1 : 1.414",
            AspectMode::CanvasPortrait4x5 => "Canvas – Portrait 4 : 5",
            AspectMode::CanvasLandscape5x4 => "Canvas – Landscape 5 : 4",
            AspectMode::CanvasClassic3x4 => "Canvas – Classic 3 : 4",
            AspectMode::CanvasClassic4x3 => "Canvas – Classic 4 : 3",
            AspectMode::PrintPhoto2x3 => "Print / Photography 2 : 3",
            AspectMode::PrintPhoto3x2 => "Print / Photography 3 : 2",
            AspectMode::Square => "Square 1 : 1",
            AspectMode::Custom => "Custom",
        }
    }

    /// Fixed `width / height` of the preset modes.
    ///
    /// `None` for `Free`, `Original` and `Custom`, which depend on runtime
    /// input.
    pub fn preset_ratio(self) -> Option<f64> {
        match self {
            AspectMode::ASeriesLandscape => Some(A_SERIES),
            AspectMode::ASeriesPortrait => Some(1.0 / A_SERIES),
            AspectMode::CanvasPortrait4x5 => Some(4.0 / 5.0),
            AspectMode::CanvasLandscape5x4 => Some(5.0 / 4.0),
            AspectMode::CanvasClassic3x4 => Some(3.0 / 4.0),
            AspectMode::CanvasClassic4x3 => Some(4.0 / 3.0),
            AspectMode::PrintPhoto2x3 => Some(2.0 / 3.0),
            AspectMode::PrintPhoto3x2 => Some(3.0 / 2.0),
            AspectMode::Square => Some(1.0),
            AspectMode::Free | AspectMode::Original | AspectMode::Custom => None,
        }
    }

    /// Ratio of stage fractions (`draft.w / draft.h`) this mode asks for.
    ///
    /// # Arguments
    ///
    /// * `frame` - Pixel size of the crop frame: the measured overlay box, or
    ///   the stage when the overlay has not been measured
    /// * `layout` - Current stage layout, for `Original`
    /// * `custom` - The validated custom ratio, for `Custom`
    ///
    /// Returns `None` when no constraint applies, including when the frame
    /// or image has a zero dimension.
    pub fn stage_ratio(
        self,
        frame: Size,
        layout: &StageLayout,
        custom: Option<CustomAspect>,
    ) -> Option<f64> {
        if !frame.is_measured() {
            return None;
        }
        let distortion = frame.h / frame.w;
        let pixel_ratio = match self {
            AspectMode::Free => return None,
            AspectMode::Original => layout.img_size().aspect()?,
            AspectMode::Custom => custom?.ratio(),
            preset => preset.preset_ratio()?,
        };
        Some(pixel_ratio * distortion)
    }
}

impl fmt::Display for AspectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectMode {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| CropError::UnknownAspectMode(s.to_string()))
    }
}

/// A validated user-entered `width : height` ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomAspect {
    width: f64,
    height: f64,
}

impl CustomAspect {
    /// Both sides must be finite and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self, CropError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CropError::InvalidCustomAspect(format!("{}:{}", width, height)));
        }
        Ok(Self { width, height })
    }

    /// Parse the two text fields of the custom ratio editor.
    pub fn parse(width: &str, height: &str) -> Result<Self, CropError> {
        let invalid = || CropError::InvalidCustomAspect(format!("{}:{}", width, height));
        let w = width.trim().parse::<f64>().map_err(|_| invalid())?;
        let h = height.trim().parse::<f64>().map_err(|_| invalid())?;
        Self::new(w, h).map_err(|_| invalid())
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// `width / height`.
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

impl Default for CustomAspect {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Refit `rect` to `ratio` around its center.
///
/// The larger dimension (relative to the ratio) shrinks, both dimensions are
/// kept in `[min_size, 1]`, and the result is slid back inside the unit
/// square. Used when the aspect mode changes.
pub fn refit_centered(rect: NormalizedRect, ratio: f64, min_size: f64) -> NormalizedRect {
    if !(ratio > 0.0 && rect.h > 0.0) {
        return rect.clamped(min_size);
    }
    let (mut w, mut h) = (rect.w, rect.h);
    if w / h > ratio {
        w = h * ratio;
    } else {
        h = w / ratio;
    }
    let center = rect.center();
    NormalizedRect::new(center.x - w / 2.0, center.y - h / 2.0, w, h).clamped(min_size)
}

/// Constrain a live-edited rectangle to `ratio`, without recentering.
///
/// The larger dimension shrinks first; then per-axis minimums derived from
/// `min_size` are applied, and neither side may exceed 1. `x`/`y` are left
/// to the caller, which re-anchors the rectangle.
pub(crate) fn constrain_size(w: f64, h: f64, ratio: f64, min_size: f64) -> (f64, f64) {
    let (mut w, mut h) = (w, h);
    if w > 0.0 && h > 0.0 {
        if w / h > ratio {
            w = h * ratio;
        } else {
            h = w / ratio;
        }
    }

    let (min_w, min_h) = if ratio >= 1.0 {
        (min_size * ratio, min_size)
    } else {
        (min_size, min_size / ratio)
    };
    if h < min_h {
        h = min_h;
        w = h * ratio;
    }
    if w < min_w {
        w = min_w;
        h = w / ratio;
    }
    if w > 1.0 {
        w = 1.0;
        h = w / ratio;
    }
    if h > 1.0 {
        h = 1.0;
        w = h * ratio;
    }
    // Extreme ratios cannot honor both the minimum and the unit bound.
    (w.clamp(min_size, 1.0), h.clamp(min_size, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_layout() -> StageLayout {
        StageLayout {
            img_w: 300.0,
            img_h: 300.0,
            stage_w: 300.0,
            stage_h: 300.0,
        }
    }

    #[test]
    fn test_mode_ids_round_trip() {
        for mode in AspectMode::ALL {
            assert_eq!(mode.as_str().parse::<AspectMode>().unwrap(), mode);
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn test_unknown_mode() {
        assert!(matches!(
            "panorama".parse::<AspectMode>(),
            Err(CropError::UnknownAspectMode(name)) if name == "panorama"
        ));
    }

    #[test]
    fn test_nine_presets() {
        let presets = AspectMode::ALL
            .into_iter()
            .filter(|m| m.preset_ratio().is_some())
            .count();
        assert_eq!(presets, 9);
    }

    #[test]
    fn test_stage_ratio_corrects_for_frame_distortion() {
        let layout = square_layout();
        // Frame twice as wide as tall: a square needs w = h/2 in fractions
        let frame = Size::new(400.0, 200.0);
        let r = AspectMode::Square.stage_ratio(frame, &layout, None).unwrap();
        assert!((r - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_stage_ratio_original_uses_image() {
        let layout = StageLayout {
            img_w: 400.0,
            img_h: 200.0,
            stage_w: 400.0,
            stage_h: 200.0,
        };
        let r = AspectMode::Original
            .stage_ratio(layout.stage_size(), &layout, None)
            .unwrap();
        // 2:1 image on a 2:1 stage is the full stage
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stage_ratio_none_cases() {
        let layout = square_layout();
        let frame = layout.stage_size();
        assert_eq!(AspectMode::Free.stage_ratio(frame, &layout, None), None);
        assert_eq!(AspectMode::Custom.stage_ratio(frame, &layout, None), None);
        assert_eq!(AspectMode::Square.stage_ratio(Size::ZERO, &layout, None), None);
        assert_eq!(
            AspectMode::Original.stage_ratio(frame, &StageLayout::EMPTY, None),
            None
        );
    }

    #[test]
    fn test_custom_aspect_validation() {
        let custom = CustomAspect::parse("16", "9").unwrap();
        assert!((custom.ratio() - 16.0 / 9.0).abs() < 1e-12);
        assert!(CustomAspect::parse("0", "9").is_err());
        assert!(CustomAspect::parse("-1", "9").is_err());
        assert!(CustomAspect::parse("abc", "9").is_err());
        assert!(CustomAspect::parse("1", "inf").is_err());
        assert!(CustomAspect::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_refit_centered_to_square() {
        let rect = NormalizedRect::new(0.1, 0.1, 0.6, 0.3);
        let r = refit_centered(rect, 1.0, 0.03);
        assert!((r.w - r.h).abs() < 1e-12);
        let (c0, c1) = (rect.center(), r.center());
        assert!((c0.x - c1.x).abs() < 1e-12);
        assert!((c0.y - c1.y).abs() < 1e-12);
    }

    #[test]
    fn test_refit_centered_slides_inside() {
        // Tall refit near the bottom edge gets pushed back up
        let rect = NormalizedRect::new(0.0, 0.9, 0.5, 0.1);
        let r = refit_centered(rect, 0.5, 0.03);
        assert!(r.bottom() <= 1.0 + 1e-12);
        assert!(r.y >= 0.0);
    }

    #[test]
    fn test_constrain_size_minimums() {
        let (w, h) = constrain_size(0.001, 0.001, 2.0, 0.03);
        assert!((h - 0.03).abs() < 1e-12);
        assert!((w - 0.06).abs() < 1e-12);

        let (w, h) = constrain_size(0.001, 0.001, 0.5, 0.03);
        assert!((w - 0.03).abs() < 1e-12);
        assert!((h - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_constrain_size_caps_at_one() {
        let (w, h) = constrain_size(5.0, 1.0, 2.0, 0.03);
        assert!((w - 1.0).abs() < 1e-12);
        assert!((h - 0.5).abs() < 1e-12);
    }
}
