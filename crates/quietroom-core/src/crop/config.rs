//! Tunables for the interactive crop tool.

use serde::{Deserialize, Serialize};

use super::MIN_CROP_SIZE;
use crate::geometry::NormalizedRect;

/// Crop tool settings.
///
/// Every field has a default, so a partial settings object (or none at all)
/// deserializes cleanly.
///
/// # Example
///
/// ```
/// use quietroom_core::crop::CropToolConfig;
///
/// let config: CropToolConfig = serde_json::from_str(r#"{ "handle_tolerance_px": 10 }"#).unwrap();
/// assert_eq!(config.handle_tolerance_px, 10.0);
/// assert_eq!(config.min_crop_size, 0.03);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropToolConfig {
    /// Smallest committed width/height, as a stage fraction
    pub min_crop_size: f64,
    /// Distance in screen pixels within which a corner handle is grabbed
    pub handle_tolerance_px: f64,
    /// Draft used when entering crop mode without an existing crop
    pub default_draft: NormalizedRect,
    /// Threshold below which two drafts are considered equal
    pub overlay_epsilon: f64,
}

impl Default for CropToolConfig {
    fn default() -> Self {
        Self {
            min_crop_size: MIN_CROP_SIZE,
            handle_tolerance_px: 6.0,
            default_draft: NormalizedRect::new(0.1, 0.1, 0.8, 0.8),
            overlay_epsilon: 1e-4,
        }
    }
}

impl CropToolConfig {
    /// Replace nonsensical values with defaults.
    ///
    /// Settings come from user-editable files, so a negative tolerance or a
    /// minimum above 1 is treated as absent rather than rejected.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_crop_size > 0.0 && self.min_crop_size <= 1.0) {
            tracing::warn!(value = self.min_crop_size, "ignoring invalid min_crop_size");
            self.min_crop_size = defaults.min_crop_size;
        }
        if !(self.handle_tolerance_px >= 0.0 && self.handle_tolerance_px.is_finite()) {
            tracing::warn!(
                value = self.handle_tolerance_px,
                "ignoring invalid handle_tolerance_px"
            );
            self.handle_tolerance_px = defaults.handle_tolerance_px;
        }
        if !(self.overlay_epsilon > 0.0 && self.overlay_epsilon.is_finite()) {
            self.overlay_epsilon = defaults.overlay_epsilon;
        }
        self.default_draft = match self.default_draft.validate() {
            Ok(rect) if rect.is_committable(self.min_crop_size) => rect,
            _ => defaults.default_draft,
        };
        self
    }
}
