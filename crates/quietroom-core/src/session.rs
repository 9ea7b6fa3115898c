//! Per-viewer override cache.
//!
//! While the viewer is open, rotation and crop edits are shown immediately
//! even though persisting them is asynchronous. A [`ViewerSession`] sits in
//! front of the embedder's port, remembers the latest value per image, and is
//! dropped with the viewer.

use std::collections::HashMap;

use crate::crop::{RotationChange, ViewerPort};
use crate::geometry::NormalizedRect;
use crate::transform::Rotation;

/// Overrides recorded since the viewer opened.
#[derive(Debug, Default)]
pub struct ViewerSession<P: ViewerPort> {
    inner: P,
    rotations: HashMap<String, Rotation>,
    crops: HashMap<String, Option<NormalizedRect>>,
}

impl<P: ViewerPort> ViewerSession<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            rotations: HashMap::new(),
            crops: HashMap::new(),
        }
    }

    /// Rotation to display for `id`: the override if any, else `persisted`.
    pub fn resolve_rotation(&self, id: &str, persisted: Rotation) -> Rotation {
        self.rotations.get(id).copied().unwrap_or(persisted)
    }

    /// Crop to display for `id`. A cleared crop overrides a persisted one.
    pub fn resolve_crop(
        &self,
        id: &str,
        persisted: Option<NormalizedRect>,
    ) -> Option<NormalizedRect> {
        match self.crops.get(id) {
            Some(crop) => *crop,
            None => persisted,
        }
    }

    /// True if any image was edited during this session.
    pub fn has_overrides(&self) -> bool {
        !self.rotations.is_empty() || !self.crops.is_empty()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop the overrides for `id`, e.g. once the store has caught up.
    pub fn forget(&mut self, id: &str) {
        self.rotations.remove(id);
        self.crops.remove(id);
    }

    /// Close the viewer, discarding every override.
    pub fn close(self) -> P {
        tracing::debug!(
            rotations = self.rotations.len(),
            crops = self.crops.len(),
            "closing viewer session"
        );
        self.inner
    }
}

impl<P: ViewerPort> ViewerPort for ViewerSession<P> {
    fn crop_changed(&mut self, id: &str, crop: Option<NormalizedRect>) {
        self.crops.insert(id.to_string(), crop);
        self.inner.crop_changed(id, crop);
    }

    fn rotation_changed(&mut self, id: &str, rotation: Rotation, change: RotationChange) {
        self.rotations.insert(id.to_string(), rotation);
        self.inner.rotation_changed(id, rotation, change);
    }

    fn crop_mode_changed(&mut self, enabled: bool) {
        self.inner.crop_mode_changed(enabled);
    }
}
