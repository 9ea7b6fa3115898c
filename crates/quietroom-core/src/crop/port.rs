//! The boundary between the crop tool and the embedding application.
//!
//! The tool never persists anything. It reports crop and rotation changes
//! through [`ViewerPort`], and the embedder decides what to store.

use serde::{Deserialize, Serialize};

use crate::geometry::NormalizedRect;
use crate::transform::Rotation;

/// Whether a rotation change is a live preview or a final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationChange {
    /// Emitted while a slider is dragged or a number is typed.
    Preview,
    /// Emitted when the slider is released or the input is committed.
    Commit,
}

/// Callbacks the crop tool invokes on its embedder.
pub trait ViewerPort {
    /// A crop was applied, remapped after a rotation, or cleared (`None`).
    fn crop_changed(&mut self, id: &str, crop: Option<NormalizedRect>);

    /// The displayed rotation changed.
    fn rotation_changed(&mut self, id: &str, rotation: Rotation, change: RotationChange);

    /// Crop mode was entered or left.
    fn crop_mode_changed(&mut self, _enabled: bool) {}
}

impl<P: ViewerPort + ?Sized> ViewerPort for &mut P {
    fn crop_changed(&mut self, id: &str, crop: Option<NormalizedRect>) {
        (**self).crop_changed(id, crop);
    }

    fn rotation_changed(&mut self, id: &str, rotation: Rotation, change: RotationChange) {
        (**self).rotation_changed(id, rotation, change);
    }

    fn crop_mode_changed(&mut self, enabled: bool) {
        (**self).crop_mode_changed(enabled);
    }
}

/// A port that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPort;

impl ViewerPort for NullPort {
    fn crop_changed(&mut self, _id: &str, _crop: Option<NormalizedRect>) {}

    fn rotation_changed(&mut self, _id: &str, _rotation: Rotation, _change: RotationChange) {}
}

/// Every event a [`RecordingPort`] has seen.
#[derive(Debug, Clone, PartialEq)]
pub enum PortEvent {
    Crop(String, Option<NormalizedRect>),
    Rotation(String, Rotation, RotationChange),
    CropMode(bool),
}

/// A port that keeps a log of events, for tests and for embedders that
/// batch persistence.
#[derive(Debug, Clone, Default)]
pub struct RecordingPort {
    pub events: Vec<PortEvent>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<PortEvent> {
        std::mem::take(&mut self.events)
    }

    /// The most recent crop event, if any.
    pub fn last_crop(&self) -> Option<&Option<NormalizedRect>> {
        self.events.iter().rev().find_map(|e| match e {
            PortEvent::Crop(_, crop) => Some(crop),
            _ => None,
        })
    }

    /// The most recent rotation event, if any.
    pub fn last_rotation(&self) -> Option<(Rotation, RotationChange)> {
        self.events.iter().rev().find_map(|e| match e {
            PortEvent::Rotation(_, rotation, change) => Some((*rotation, *change)),
            _ => None,
        })
    }
}

impl ViewerPort for RecordingPort {
    fn crop_changed(&mut self, id: &str, crop: Option<NormalizedRect>) {
        self.events.push(PortEvent::Crop(id.to_string(), crop));
    }

    fn rotation_changed(&mut self, id: &str, rotation: Rotation, change: RotationChange) {
        self.events
            .push(PortEvent::Rotation(id.to_string(), rotation, change));
    }

    fn crop_mode_changed(&mut self, enabled: bool) {
        self.events.push(PortEvent::CropMode(enabled));
    }
}
