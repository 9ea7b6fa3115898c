//! Synchronized rotation slider and number input.
//!
//! The slider and the text field show the same signed angle. Either one can
//! drive it; while one of them is being edited, external rotation updates
//! must not overwrite what the user is doing.

use crate::transform::{clamp_signed, parse_degrees, Rotation};

/// What the control wants the tool to do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationIntent {
    /// Nothing to report.
    None,
    /// Show this rotation without persisting it.
    Preview(Rotation),
    /// Persist this rotation.
    Commit(Rotation),
}

/// State of the rotation slider and its text field.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationControl {
    signed: i32,
    input: String,
    slider_dragging: bool,
    input_editing: bool,
}

impl RotationControl {
    pub fn new(rotation: Rotation) -> Self {
        let signed = rotation.signed();
        Self {
            signed,
            input: signed.to_string(),
            slider_dragging: false,
            input_editing: false,
        }
    }

    /// Signed angle shown by the slider.
    pub fn signed(&self) -> i32 {
        self.signed
    }

    /// Raw text of the number input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// True while the slider is held or the text field has focus.
    pub fn is_interacting(&self) -> bool {
        self.slider_dragging || self.input_editing
    }

    pub fn is_slider_dragging(&self) -> bool {
        self.slider_dragging
    }

    /// Follow an externally changed rotation, unless the user is editing.
    pub fn sync(&mut self, rotation: Rotation) {
        if self.is_interacting() {
            return;
        }
        self.set_signed(rotation.signed());
    }

    pub fn slider_pointer_down(&mut self) {
        self.slider_dragging = true;
    }

    /// Releasing the slider commits the angle it shows.
    pub fn slider_pointer_up(&mut self) -> RotationIntent {
        if !self.slider_dragging {
            return RotationIntent::None;
        }
        self.slider_dragging = false;
        RotationIntent::Commit(Rotation::from_signed(self.signed))
    }

    pub fn slider_changed(&mut self, signed: i32) -> RotationIntent {
        let signed = clamp_signed(f64::from(signed));
        self.set_signed(signed);
        RotationIntent::Preview(Rotation::from_signed(signed))
    }

    pub fn input_focused(&mut self) {
        self.input_editing = true;
    }

    /// Typing previews every value that parses; other text is kept as-is
    /// until the field is committed.
    pub fn input_changed(&mut self, text: &str) -> RotationIntent {
        self.input = text.to_string();
        match parse_degrees(text) {
            Some(value) => {
                self.signed = clamp_signed(value);
                RotationIntent::Preview(Rotation::from_signed(self.signed))
            }
            None => RotationIntent::None,
        }
    }

    /// Blur and Enter both commit. Unparsable text reverts to the last good
    /// angle.
    pub fn input_committed(&mut self) -> RotationIntent {
        self.input_editing = false;
        match parse_degrees(&self.input) {
            Some(value) => {
                let signed = clamp_signed(value);
                self.set_signed(signed);
                RotationIntent::Commit(Rotation::from_signed(signed))
            }
            None => {
                tracing::debug!(input = %self.input, "reverting unparsable rotation input");
                self.input = self.signed.to_string();
                RotationIntent::None
            }
        }
    }

    /// Reset the transient interaction flags, e.g. when the viewer switches
    /// to another image.
    pub fn reset(&mut self, rotation: Rotation) {
        *self = Self::new(rotation);
    }

    fn set_signed(&mut self, signed: i32) {
        self.signed = signed;
        self.input = signed.to_string();
    }
}

impl Default for RotationControl {
    fn default() -> Self {
        Self::new(Rotation::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_from_signed_rotation() {
        let control = RotationControl::new(Rotation::from_degrees(270));
        assert_eq!(control.signed(), -90);
        assert_eq!(control.input(), "-90");
    }

    #[test]
    fn test_slider_previews_then_commits() {
        let mut control = RotationControl::default();
        control.slider_pointer_down();
        assert_eq!(
            control.slider_changed(-30),
            RotationIntent::Preview(Rotation::from_degrees(330))
        );
        assert_eq!(control.input(), "-30");
        assert_eq!(
            control.slider_pointer_up(),
            RotationIntent::Commit(Rotation::from_degrees(330))
        );
        // A stray pointer-up without a drag does nothing
        assert_eq!(control.slider_pointer_up(), RotationIntent::None);
    }

    #[test]
    fn test_sync_ignored_while_interacting() {
        let mut control = RotationControl::default();
        control.slider_pointer_down();
        control.slider_changed(10);
        control.sync(Rotation::from_degrees(90));
        assert_eq!(control.signed(), 10);

        control.slider_pointer_up();
        control.sync(Rotation::from_degrees(90));
        assert_eq!(control.signed(), 90);
    }

    #[test]
    fn test_input_typing_and_commit() {
        let mut control = RotationControl::default();
        control.input_focused();
        assert_eq!(control.input_changed("-"), RotationIntent::None);
        assert_eq!(control.input(), "-");
        assert_eq!(
            control.input_changed("-45"),
            RotationIntent::Preview(Rotation::from_degrees(315))
        );
        assert_eq!(
            control.input_committed(),
            RotationIntent::Commit(Rotation::from_degrees(315))
        );
        assert!(!control.is_interacting());
    }

    #[test]
    fn test_input_clamps_out_of_range() {
        let mut control = RotationControl::default();
        control.input_focused();
        control.input_changed("500");
        assert_eq!(control.signed(), 180);
        assert_eq!(
            control.input_committed(),
            RotationIntent::Commit(Rotation::from_degrees(180))
        );
        assert_eq!(control.input(), "180");
    }

    #[test]
    fn test_invalid_input_reverts_on_commit() {
        let mut control = RotationControl::new(Rotation::from_degrees(30));
        control.input_focused();
        control.input_changed("abc");
        assert_eq!(control.input_committed(), RotationIntent::None);
        assert_eq!(control.input(), "30");
        assert_eq!(control.signed(), 30);
    }
}
