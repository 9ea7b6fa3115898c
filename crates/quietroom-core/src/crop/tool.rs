//! Interactive crop tool.
//!
//! A pointer-driven state machine on top of the pure layout and mapping
//! functions:
//!
//! ```text
//! Idle --toggle--> Cropping --pointer down--> DraggingNew | Moving | ResizingCorner
//!   ^                 |   ^                          |
//!   |                 |   +-------pointer up---------+
//!   +--apply/cancel---+
//! ```
//!
//! The draft rectangle lives in stage space and is screen-aligned: when the
//! rotation changes while cropping, the stage is re-measured and the draft
//! keeps its on-screen position while the image rotates underneath.

use serde::{Deserialize, Serialize};

use super::aspect::{constrain_size, refit_centered, AspectMode, CustomAspect};
use super::config::CropToolConfig;
use super::port::{RotationChange, ViewerPort};
use super::rotation_control::{RotationControl, RotationIntent};
use super::CropError;
use crate::geometry::{NormalizedRect, Point, Size};
use crate::transform::{
    aspect_label, compute_stage_layout, effective_natural_size, remap_crop_for_rotation, Rotation,
    StageLayout,
};

/// A rectangle in screen (client) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub w: f64,
    pub h: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, w: f64, h: f64) -> Self {
        Self { left, top, w, h }
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Convert a client position into fractions of this box.
    fn normalize(&self, client_x: f64, client_y: f64) -> Point {
        Point::new((client_x - self.left) / self.w, (client_y - self.top) / self.h)
    }

    /// The part of this box covered by `rect`.
    fn project(&self, rect: NormalizedRect) -> ScreenRect {
        ScreenRect::new(
            self.left + rect.x * self.w,
            self.top + rect.y * self.h,
            rect.w * self.w,
            rect.h * self.h,
        )
    }
}

/// Corner handles of the draft rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];

    pub fn as_str(self) -> &'static str {
        match self {
            Corner::Nw => "nw",
            Corner::Ne => "ne",
            Corner::Sw => "sw",
            Corner::Se => "se",
        }
    }

    /// Position of this corner on `rect`.
    pub fn point(self, rect: &NormalizedRect) -> Point {
        match self {
            Corner::Nw => Point::new(rect.x, rect.y),
            Corner::Ne => Point::new(rect.right(), rect.y),
            Corner::Sw => Point::new(rect.x, rect.bottom()),
            Corner::Se => Point::new(rect.right(), rect.bottom()),
        }
    }

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::Nw => Corner::Se,
            Corner::Ne => Corner::Sw,
            Corner::Sw => Corner::Ne,
            Corner::Se => Corner::Nw,
        }
    }
}

/// Externally visible state of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropPhase {
    Idle,
    Cropping,
    DraggingNew,
    Moving,
    ResizingCorner(Corner),
}

impl CropPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            CropPhase::Idle => "idle",
            CropPhase::Cropping => "cropping",
            CropPhase::DraggingNew => "dragging_new",
            CropPhase::Moving => "moving",
            CropPhase::ResizingCorner(_) => "resizing_corner",
        }
    }
}

/// An in-progress pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    DraggingNew {
        anchor: Point,
    },
    Moving {
        start: Point,
        rect: NormalizedRect,
    },
    Resizing {
        corner: Corner,
        start: Point,
        rect: NormalizedRect,
    },
}

/// Transient state that only exists while cropping.
#[derive(Debug, Clone, PartialEq)]
struct Session {
    draft: NormalizedRect,
    gesture: Option<Gesture>,
    /// Where the user last put the draft on screen.
    pinned: Option<ScreenRect>,
}

/// Crop and rotation controller for one image in the viewer.
#[derive(Debug)]
pub struct CropTool<P: ViewerPort> {
    id: String,
    config: CropToolConfig,
    port: P,
    container: Size,
    natural: Size,
    /// Rotation currently displayed, including previews
    rotation: Rotation,
    /// Rotation last committed or loaded
    committed_rotation: Rotation,
    /// Committed crop, in stage space
    crop: Option<NormalizedRect>,
    session: Option<Session>,
    overlay: Option<ScreenRect>,
    aspect: AspectMode,
    custom: Option<CustomAspect>,
    rotation_control: RotationControl,
}

impl<P: ViewerPort> CropTool<P> {
    /// Create a tool for the image `id` with no crop and no rotation.
    pub fn new(id: impl Into<String>, port: P, config: CropToolConfig) -> Self {
        Self {
            id: id.into(),
            config: config.sanitized(),
            port,
            container: Size::ZERO,
            natural: Size::ZERO,
            rotation: Rotation::ZERO,
            committed_rotation: Rotation::ZERO,
            crop: None,
            session: None,
            overlay: None,
            aspect: AspectMode::Free,
            custom: Some(CustomAspect::default()),
            rotation_control: RotationControl::default(),
        }
    }

    /// Switch to another image, dropping any crop session.
    ///
    /// The natural size is forgotten until the new image reports it.
    pub fn load(&mut self, id: impl Into<String>, rotation: Rotation, crop: Option<NormalizedRect>) {
        self.leave_crop_mode();
        self.id = id.into();
        self.natural = Size::ZERO;
        self.rotation = rotation;
        self.committed_rotation = rotation;
        self.crop = crop.and_then(NormalizedRect::sanitized);
        self.rotation_control.reset(rotation);
        tracing::debug!(id = %self.id, rotation = rotation.degrees(), crop = ?self.crop, "loaded image");
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &CropToolConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Committed crop in stage space.
    pub fn crop(&self) -> Option<NormalizedRect> {
        self.crop
    }

    /// Current draft, only while cropping.
    pub fn draft(&self) -> Option<NormalizedRect> {
        self.session.as_ref().map(|s| s.draft)
    }

    pub fn is_cropping(&self) -> bool {
        self.session.is_some()
    }

    pub fn phase(&self) -> CropPhase {
        match &self.session {
            None => CropPhase::Idle,
            Some(Session { gesture: None, .. }) => CropPhase::Cropping,
            Some(Session {
                gesture: Some(gesture),
                ..
            }) => match gesture {
                Gesture::DraggingNew { .. } => CropPhase::DraggingNew,
                Gesture::Moving { .. } => CropPhase::Moving,
                Gesture::Resizing { corner, .. } => CropPhase::ResizingCorner(*corner),
            },
        }
    }

    pub fn overlay_box(&self) -> Option<ScreenRect> {
        self.overlay
    }

    pub fn aspect_mode(&self) -> AspectMode {
        self.aspect
    }

    pub fn custom_aspect(&self) -> Option<CustomAspect> {
        self.custom
    }

    pub fn rotation_control(&self) -> &RotationControl {
        &self.rotation_control
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    pub fn set_container_size(&mut self, container: Size) {
        self.container = container;
    }

    pub fn set_natural_size(&mut self, natural: Size) {
        self.natural = natural;
    }

    /// Layout at the displayed rotation.
    pub fn layout(&self) -> StageLayout {
        self.layout_for(self.rotation)
    }

    /// Layout the stage would have at `rotation`.
    pub fn layout_for(&self, rotation: Rotation) -> StageLayout {
        compute_stage_layout(self.container, self.natural, rotation.as_f64())
    }

    /// Pixel size of the visible canvas, after rotation and crop.
    pub fn effective_size(&self) -> Size {
        effective_natural_size(self.natural, self.rotation, self.crop)
    }

    /// Aspect ratio of the visible canvas, e.g. `"1.50:1"`.
    pub fn effective_aspect_label(&self) -> Option<String> {
        aspect_label(self.effective_size())
    }

    /// Record the measured on-screen bounds of the stage.
    ///
    /// While cropping, the draft keeps the screen position the user gave it:
    /// it is re-normalized against the new box and clamped.
    pub fn set_overlay_box(&mut self, overlay: Option<ScreenRect>) {
        let overlay = overlay.filter(|o| o.size().is_measured());
        self.overlay = overlay;
        let (Some(new_box), Some(session)) = (overlay, self.session.as_mut()) else {
            return;
        };

        let Some(pinned) = session.pinned else {
            session.pinned = Some(new_box.project(session.draft));
            return;
        };

        let w = pinned.w / new_box.w;
        let h = pinned.h / new_box.h;
        if !(w > 0.0 && h > 0.0) {
            return;
        }
        let rect = NormalizedRect::new(
            (pinned.left - new_box.left) / new_box.w,
            (pinned.top - new_box.top) / new_box.h,
            w,
            h,
        )
        .clamped(self.config.min_crop_size);
        if !rect.approx_eq(&session.draft, self.config.overlay_epsilon) {
            session.draft = rect;
        }
    }

    // ------------------------------------------------------------------
    // Mode transitions
    // ------------------------------------------------------------------

    /// Enter crop mode, or leave it discarding the draft.
    pub fn toggle(&mut self) {
        if self.is_cropping() {
            self.cancel();
        } else {
            self.enter();
        }
    }

    /// Enter crop mode, seeding the draft with the committed crop.
    pub fn enter(&mut self) {
        if self.is_cropping() {
            return;
        }
        let draft = match self.crop {
            Some(crop) if crop.has_area() => crop,
            _ => self.config.default_draft,
        };
        self.session = Some(Session {
            draft,
            gesture: None,
            pinned: self.overlay.map(|o| o.project(draft)),
        });
        tracing::debug!(id = %self.id, ?draft, "entered crop mode");
        self.port.crop_mode_changed(true);
    }

    /// Commit the draft as the crop and leave crop mode.
    ///
    /// Fails without side effects when not cropping or when the draft is
    /// below the minimum size.
    pub fn apply(&mut self) -> Result<NormalizedRect, CropError> {
        let draft = self.draft().ok_or(CropError::NotCropping)?;
        let min = self.config.min_crop_size;
        if !draft.is_committable(min) {
            return Err(CropError::DraftTooSmall {
                w: draft.w,
                h: draft.h,
                min,
            });
        }
        self.crop = Some(draft);
        tracing::debug!(id = %self.id, crop = ?draft, "applied crop");
        self.port.crop_changed(&self.id, Some(draft));
        self.leave_crop_mode();
        Ok(draft)
    }

    /// Discard the draft and leave crop mode.
    pub fn cancel(&mut self) {
        if self.is_cropping() {
            tracing::debug!(id = %self.id, "cancelled crop");
        }
        self.leave_crop_mode();
    }

    /// Escape behaves like Cancel. Returns true if it was consumed.
    pub fn escape(&mut self) -> bool {
        let consumed = self.is_cropping();
        self.cancel();
        consumed
    }

    /// Clear the committed crop, back to the full image.
    pub fn restore(&mut self) {
        self.leave_crop_mode();
        self.crop = None;
        tracing::debug!(id = %self.id, "restored original framing");
        self.port.crop_changed(&self.id, None);
    }

    fn leave_crop_mode(&mut self) {
        self.overlay = None;
        if self.session.take().is_some() {
            self.port.crop_mode_changed(false);
        }
    }

    // ------------------------------------------------------------------
    // Pointer gestures
    // ------------------------------------------------------------------

    /// Start a gesture at a client position.
    ///
    /// Corner handles win over the body, the body wins over the empty
    /// stage. Presses outside the stage, before the overlay is measured, or
    /// during a slider drag are ignored.
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) -> CropPhase {
        if self.rotation_control.is_slider_dragging() {
            return self.phase();
        }
        let Some(overlay) = self.overlay else {
            return self.phase();
        };
        let p = overlay.normalize(client_x, client_y);
        let tol_x = self.config.handle_tolerance_px / overlay.w;
        let tol_y = self.config.handle_tolerance_px / overlay.h;
        let Some(session) = self.session.as_mut() else {
            return CropPhase::Idle;
        };
        let draft = session.draft;

        let handle = Corner::ALL
            .into_iter()
            .map(|corner| {
                let c = corner.point(&draft);
                (corner, (p.x - c.x).abs(), (p.y - c.y).abs())
            })
            .filter(|&(_, dx, dy)| dx <= tol_x && dy <= tol_y)
            .min_by(|a, b| (a.1 + a.2).total_cmp(&(b.1 + b.2)))
            .map(|(corner, _, _)| corner);

        let gesture = if let Some(corner) = handle {
            Gesture::Resizing {
                corner,
                start: p,
                rect: draft,
            }
        } else if draft.contains(p) {
            Gesture::Moving {
                start: p,
                rect: draft,
            }
        } else if NormalizedRect::FULL.contains(p) {
            Gesture::DraggingNew { anchor: p }
        } else {
            return CropPhase::Cropping;
        };

        session.gesture = Some(gesture);
        if let Gesture::DraggingNew { anchor } = gesture {
            let rect = self.fit_anchored(anchor, anchor);
            self.set_draft(rect);
        }
        let phase = self.phase();
        tracing::trace!(x = p.x, y = p.y, phase = phase.as_str(), "crop pointer down");
        phase
    }

    /// Update the draft from the pointer position during a gesture.
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) {
        let Some(overlay) = self.overlay else {
            return;
        };
        let Some(gesture) = self.session.as_ref().and_then(|s| s.gesture) else {
            return;
        };
        let p = overlay.normalize(client_x, client_y);
        if !(p.x.is_finite() && p.y.is_finite()) {
            return;
        }

        let rect = match gesture {
            Gesture::Moving { start, rect } => NormalizedRect::new(
                rect.x + (p.x - start.x),
                rect.y + (p.y - start.y),
                rect.w,
                rect.h,
            )
            .clamped(self.config.min_crop_size),
            Gesture::Resizing {
                corner,
                start,
                rect,
            } => {
                let grabbed = corner.point(&rect);
                let target = Point::new(grabbed.x + (p.x - start.x), grabbed.y + (p.y - start.y));
                self.fit_anchored(corner.opposite().point(&rect), target)
            }
            Gesture::DraggingNew { anchor } => self.fit_anchored(anchor, p),
        };
        self.set_draft(rect);
    }

    /// End the current gesture, keeping the draft.
    pub fn pointer_up(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.gesture.take().is_some() {
                tracing::trace!(draft = ?session.draft, "crop pointer up");
            }
        }
    }

    /// Rectangle spanned by a fixed `anchor` and a moving `target`, under
    /// the active aspect constraint. The anchor stays put; only a rectangle
    /// forced up to the minimum size next to an edge is slid back inside.
    fn fit_anchored(&self, anchor: Point, target: Point) -> NormalizedRect {
        let min = self.config.min_crop_size;
        let raw = NormalizedRect::from_corners(anchor, target);
        // Only the room on the pointer's side of the anchor is available
        let room_w = if target.x < anchor.x { anchor.x } else { 1.0 - anchor.x };
        let room_h = if target.y < anchor.y { anchor.y } else { 1.0 - anchor.y };
        let raw_w = raw.w.min(room_w);
        let raw_h = raw.h.min(room_h);
        let (w, h) = match self.active_ratio() {
            Some(ratio) if ratio > 0.0 => constrain_size(raw_w, raw_h, ratio, min),
            _ => (raw_w.clamp(min, 1.0), raw_h.clamp(min, 1.0)),
        };
        let x = if target.x < anchor.x { anchor.x - w } else { anchor.x };
        let y = if target.y < anchor.y { anchor.y - h } else { anchor.y };
        NormalizedRect::new(x, y, w, h).clamped(min)
    }

    /// Replace the draft after a user edit, remembering its screen position.
    fn set_draft(&mut self, rect: NormalizedRect) {
        let overlay = self.overlay;
        if let Some(session) = self.session.as_mut() {
            session.draft = rect;
            session.pinned = overlay.map(|o| o.project(rect));
        }
    }

    // ------------------------------------------------------------------
    // Aspect ratio
    // ------------------------------------------------------------------

    /// Ratio of stage fractions the active mode asks for.
    pub fn active_ratio(&self) -> Option<f64> {
        self.ratio_for(self.aspect)
    }

    fn ratio_for(&self, mode: AspectMode) -> Option<f64> {
        let layout = self.layout();
        let frame = self
            .overlay
            .map(|o| o.size())
            .unwrap_or_else(|| layout.stage_size());
        mode.stage_ratio(frame, &layout, self.custom)
    }

    /// Select an aspect mode; an existing draft is refit around its center.
    pub fn set_aspect_mode(&mut self, mode: AspectMode) {
        self.aspect = mode;
        if mode != AspectMode::Free {
            self.refit_draft();
        }
    }

    /// Update the custom ratio as it is typed. `None` means the fields do not
    /// currently hold a valid ratio, which disables the constraint.
    pub fn set_custom_aspect(&mut self, custom: Option<CustomAspect>) {
        self.custom = custom;
    }

    /// The custom ratio fields lost focus: refit if custom mode is active.
    pub fn commit_custom_aspect(&mut self) {
        if self.aspect == AspectMode::Custom {
            self.refit_draft();
        }
    }

    fn refit_draft(&mut self) {
        let Some(ratio) = self.active_ratio() else {
            return;
        };
        if let Some(draft) = self.draft() {
            let rect = refit_centered(draft, ratio, self.config.min_crop_size);
            self.set_draft(rect);
        }
    }

    // ------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------

    /// Follow a rotation that changed outside the tool (e.g. persisted by
    /// another view). No port events are emitted.
    pub fn sync_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.committed_rotation = rotation;
        self.rotation_control.sync(rotation);
    }

    /// Quarter turn clockwise, committed immediately.
    pub fn rotate_right(&mut self) {
        let next = self.rotation.rotate_right();
        self.change_rotation(next, RotationChange::Commit);
    }

    /// Set and commit a rotation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.change_rotation(rotation, RotationChange::Commit);
    }

    pub fn slider_pointer_down(&mut self) {
        if self.session.as_ref().is_some_and(|s| s.gesture.is_some()) {
            return;
        }
        self.rotation_control.slider_pointer_down();
    }

    pub fn slider_changed(&mut self, signed: i32) {
        if self.session.as_ref().is_some_and(|s| s.gesture.is_some()) {
            return;
        }
        let intent = self.rotation_control.slider_changed(signed);
        self.apply_rotation_intent(intent);
    }

    pub fn slider_pointer_up(&mut self) {
        let intent = self.rotation_control.slider_pointer_up();
        self.apply_rotation_intent(intent);
    }

    pub fn rotation_input_focused(&mut self) {
        self.rotation_control.input_focused();
    }

    pub fn rotation_input_changed(&mut self, text: &str) {
        let intent = self.rotation_control.input_changed(text);
        self.apply_rotation_intent(intent);
    }

    /// Blur or Enter on the rotation input.
    pub fn rotation_input_committed(&mut self) {
        let intent = self.rotation_control.input_committed();
        self.apply_rotation_intent(intent);
    }

    fn apply_rotation_intent(&mut self, intent: RotationIntent) {
        match intent {
            RotationIntent::None => {}
            RotationIntent::Preview(rotation) => {
                self.change_rotation(rotation, RotationChange::Preview)
            }
            RotationIntent::Commit(rotation) => {
                self.change_rotation(rotation, RotationChange::Commit)
            }
        }
    }

    /// Display `next`, report it, and on commit carry the committed crop over
    /// to the new stage. The draft is screen-aligned and is kept in place by
    /// [`set_overlay_box`](Self::set_overlay_box) instead.
    fn change_rotation(&mut self, next: Rotation, change: RotationChange) {
        self.rotation = next;
        self.rotation_control.sync(next);
        self.port.rotation_changed(&self.id, next, change);

        if change != RotationChange::Commit {
            return;
        }
        let previous = self.committed_rotation;
        self.committed_rotation = next;
        if previous == next {
            return;
        }
        let Some(crop) = self.crop.filter(NormalizedRect::has_area) else {
            return;
        };

        let from_layout = self.layout_for(previous);
        let to_layout = self.layout_for(next);
        match remap_crop_for_rotation(
            crop,
            previous.as_f64(),
            &from_layout,
            next.as_f64(),
            &to_layout,
            self.config.min_crop_size,
        ) {
            Some(remapped) => {
                self.crop = Some(remapped);
                self.port.crop_changed(&self.id, Some(remapped));
            }
            None => {
                tracing::warn!(
                    id = %self.id,
                    from = previous.degrees(),
                    to = next.degrees(),
                    "crop not representable after rotation, keeping previous crop"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::{PortEvent, RecordingPort, MIN_CROP_SIZE};
    use crate::transform::stage_to_image_rect;

    // 800x400 image in a 400x300 container: a 400x200 stage at 0°
    fn tool() -> CropTool<RecordingPort> {
        let mut tool = CropTool::new("img-1", RecordingPort::new(), CropToolConfig::default());
        tool.set_container_size(Size::new(400.0, 300.0));
        tool.set_natural_size(Size::new(800.0, 400.0));
        tool
    }

    fn overlay() -> ScreenRect {
        ScreenRect::new(100.0, 50.0, 400.0, 200.0)
    }

    /// Client position of a stage fraction inside [`overlay`].
    fn client(x: f64, y: f64) -> (f64, f64) {
        let o = overlay();
        (o.left + x * o.w, o.top + y * o.h)
    }

    fn cropping_tool() -> CropTool<RecordingPort> {
        let mut tool = tool();
        tool.enter();
        tool.set_overlay_box(Some(overlay()));
        tool.port_mut().drain();
        tool
    }

    fn assert_rect(got: NormalizedRect, want: NormalizedRect) {
        assert!(got.approx_eq(&want, 1e-9), "got {:?}, want {:?}", got, want);
    }

    #[test]
    fn test_enter_seeds_default_draft() {
        let mut tool = tool();
        assert_eq!(tool.phase(), CropPhase::Idle);
        tool.toggle();
        assert_eq!(tool.phase(), CropPhase::Cropping);
        assert_eq!(tool.draft(), Some(NormalizedRect::new(0.1, 0.1, 0.8, 0.8)));
        assert_eq!(tool.port().events, vec![PortEvent::CropMode(true)]);
    }

    #[test]
    fn test_enter_seeds_from_committed_crop() {
        let mut tool = tool();
        let crop = NormalizedRect::new(0.2, 0.3, 0.4, 0.5);
        tool.load("img-1", Rotation::ZERO, Some(crop));
        tool.enter();
        assert_eq!(tool.draft(), Some(crop));
    }

    #[test]
    fn test_toggle_twice_discards_draft() {
        let mut tool = cropping_tool();
        tool.toggle();
        assert_eq!(tool.phase(), CropPhase::Idle);
        assert_eq!(tool.crop(), None);
        assert_eq!(tool.overlay_box(), None);
        assert_eq!(tool.port().events, vec![PortEvent::CropMode(false)]);
    }

    #[test]
    fn test_apply_commits_draft() {
        let mut tool = cropping_tool();
        let applied = tool.apply().unwrap();
        assert_eq!(applied, NormalizedRect::new(0.1, 0.1, 0.8, 0.8));
        assert_eq!(tool.crop(), Some(applied));
        assert_eq!(tool.phase(), CropPhase::Idle);
        assert_eq!(
            tool.port().events,
            vec![
                PortEvent::Crop("img-1".to_string(), Some(applied)),
                PortEvent::CropMode(false),
            ]
        );
    }

    #[test]
    fn test_apply_outside_crop_mode() {
        let mut tool = tool();
        assert!(matches!(tool.apply(), Err(CropError::NotCropping)));
        assert!(tool.port().events.is_empty());
    }

    #[test]
    fn test_apply_rejects_draft_below_minimum() {
        let config = CropToolConfig {
            min_crop_size: 0.1,
            ..CropToolConfig::default()
        };
        let mut tool = CropTool::new("img-1", RecordingPort::new(), config);
        tool.load("img-1", Rotation::ZERO, Some(NormalizedRect::new(0.0, 0.0, 0.05, 0.5)));
        tool.enter();
        assert!(matches!(tool.apply(), Err(CropError::DraftTooSmall { .. })));
        assert!(tool.is_cropping());
        assert_eq!(tool.crop(), Some(NormalizedRect::new(0.0, 0.0, 0.05, 0.5)));
    }

    #[test]
    fn test_escape_cancels() {
        let mut tool = cropping_tool();
        assert!(tool.escape());
        assert!(!tool.is_cropping());
        assert!(!tool.escape());
    }

    #[test]
    fn test_restore_clears_crop() {
        let mut tool = tool();
        tool.load("img-1", Rotation::ZERO, Some(NormalizedRect::new(0.2, 0.2, 0.5, 0.5)));
        tool.restore();
        assert_eq!(tool.crop(), None);
        assert_eq!(tool.port().last_crop(), Some(&None));
    }

    #[test]
    fn test_pointer_ignored_until_overlay_measured() {
        let mut tool = tool();
        tool.enter();
        assert_eq!(tool.pointer_down(300.0, 150.0), CropPhase::Cropping);
        tool.pointer_move(400.0, 200.0);
        assert_eq!(tool.draft(), Some(NormalizedRect::new(0.1, 0.1, 0.8, 0.8)));
    }

    #[test]
    fn test_resize_corner_within_tolerance() {
        let mut tool = cropping_tool();
        // SE corner sits at (460, 230); grab it 2px off
        assert_eq!(tool.pointer_down(462.0, 228.0), CropPhase::ResizingCorner(Corner::Se));
        let (x, y) = client(0.95, 0.95);
        tool.pointer_move(x, y);
        // The grab offset is preserved: corner moves by the pointer delta
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.1, 0.1, 0.845, 0.86));
        tool.pointer_up();
        assert_eq!(tool.phase(), CropPhase::Cropping);
    }

    #[test]
    fn test_resize_nw_keeps_se_fixed() {
        let mut tool = cropping_tool();
        let (x, y) = client(0.1, 0.1);
        assert_eq!(tool.pointer_down(x, y), CropPhase::ResizingCorner(Corner::Nw));
        let (x, y) = client(0.3, 0.4);
        tool.pointer_move(x, y);
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.3, 0.4, 0.6, 0.5));
    }

    #[test]
    fn test_move_body_is_clamped() {
        let mut tool = cropping_tool();
        let (x, y) = client(0.5, 0.5);
        assert_eq!(tool.pointer_down(x, y), CropPhase::Moving);
        let (x, y) = client(1.0, 0.5);
        tool.pointer_move(x, y);
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.2, 0.1, 0.8, 0.8));
    }

    #[test]
    fn test_drag_new_from_empty_stage() {
        let mut tool = tool();
        tool.load("img-1", Rotation::ZERO, Some(NormalizedRect::new(0.1, 0.1, 0.2, 0.2)));
        tool.enter();
        tool.set_overlay_box(Some(overlay()));

        let (x, y) = client(0.6, 0.6);
        assert_eq!(tool.pointer_down(x, y), CropPhase::DraggingNew);
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.6, 0.6, 0.03, 0.03));

        // Dragging up-left keeps the press point as the bottom-right corner
        let (x, y) = client(0.4, 0.5);
        tool.pointer_move(x, y);
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.4, 0.5, 0.2, 0.1));
    }

    #[test]
    fn test_drag_far_outside_stage_keeps_anchor() {
        let mut tool = tool();
        tool.load("img-1", Rotation::ZERO, Some(NormalizedRect::new(0.1, 0.1, 0.2, 0.2)));
        tool.enter();
        tool.set_overlay_box(Some(overlay()));

        let (x, y) = client(0.6, 0.6);
        tool.pointer_down(x, y);
        tool.pointer_move(1000.0, -500.0);
        // The press point stays the bottom-left corner
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.6, 0.0, 0.4, 0.6));
    }

    #[test]
    fn test_resize_past_edge_keeps_opposite_corner() {
        let mut tool = cropping_tool();
        let (x, y) = client(0.1, 0.1);
        assert_eq!(tool.pointer_down(x, y), CropPhase::ResizingCorner(Corner::Nw));
        let (x, y) = client(-0.5, 0.1);
        tool.pointer_move(x, y);
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.0, 0.1, 0.9, 0.8));
    }

    #[test]
    fn test_locked_resize_past_edge_keeps_opposite_corner() {
        let mut tool = cropping_tool();
        tool.set_aspect_mode(AspectMode::Square);
        let (x, y) = client(0.7, 0.9);
        assert_eq!(tool.pointer_down(x, y), CropPhase::ResizingCorner(Corner::Se));
        let (x, y) = client(2.0, 3.0);
        tool.pointer_move(x, y);
        let draft = tool.draft().unwrap();
        assert_rect(draft, NormalizedRect::new(0.3, 0.1, 0.45, 0.9));
        assert!((draft.w * 400.0 - draft.h * 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_press_outside_stage_is_ignored() {
        let mut tool = cropping_tool();
        assert_eq!(tool.pointer_down(10.0, 10.0), CropPhase::Cropping);
        assert_eq!(tool.draft(), Some(NormalizedRect::new(0.1, 0.1, 0.8, 0.8)));
    }

    #[test]
    fn test_square_refit_corrects_for_frame() {
        let mut tool = cropping_tool();
        tool.set_aspect_mode(AspectMode::Square);
        // 400x200 frame: a square is half as wide in fractions
        let draft = tool.draft().unwrap();
        assert_rect(draft, NormalizedRect::new(0.3, 0.1, 0.4, 0.8));
        assert!((draft.w * 400.0 - draft.h * 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_refit_on_undistorted_stage() {
        let mut tool = CropTool::new("img-1", RecordingPort::new(), CropToolConfig::default());
        tool.set_container_size(Size::new(300.0, 300.0));
        tool.load("img-1", Rotation::ZERO, Some(NormalizedRect::new(0.1, 0.1, 0.6, 0.3)));
        tool.set_natural_size(Size::new(300.0, 300.0));
        tool.enter();
        tool.set_overlay_box(Some(ScreenRect::new(0.0, 0.0, 300.0, 300.0)));
        tool.set_aspect_mode(AspectMode::Square);
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.25, 0.1, 0.3, 0.3));
    }

    #[test]
    fn test_locked_resize_keeps_opposite_corner() {
        let mut tool = cropping_tool();
        tool.set_aspect_mode(AspectMode::Square);
        let (x, y) = client(0.7, 0.9);
        assert_eq!(tool.pointer_down(x, y), CropPhase::ResizingCorner(Corner::Se));
        let (x, y) = client(0.75, 1.0);
        tool.pointer_move(x, y);
        let draft = tool.draft().unwrap();
        assert_rect(draft, NormalizedRect::new(0.3, 0.1, 0.45, 0.9));
        assert!((draft.w * 400.0 - draft.h * 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_aspect_refits_on_commit() {
        let mut tool = cropping_tool();
        tool.set_aspect_mode(AspectMode::Custom);
        // Default 1:1 applies right away
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.3, 0.1, 0.4, 0.8));

        tool.set_custom_aspect(CustomAspect::parse("2", "1").ok());
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.3, 0.1, 0.4, 0.8));
        tool.commit_custom_aspect();
        // 2:1 on a 2:1 frame is w == h in fractions
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.3, 0.3, 0.4, 0.4));
    }

    #[test]
    fn test_invalid_custom_aspect_disables_constraint() {
        let mut tool = cropping_tool();
        tool.set_aspect_mode(AspectMode::Custom);
        tool.set_custom_aspect(CustomAspect::parse("0", "1").ok());
        assert_eq!(tool.active_ratio(), None);
    }

    #[test]
    fn test_draft_keeps_screen_position_when_stage_moves() {
        let mut tool = cropping_tool();
        tool.rotate_right();
        // At 90° the stage is 150x300, centered in the 400px container
        let rotated = ScreenRect::new(225.0, 0.0, 150.0, 300.0);
        tool.set_overlay_box(Some(rotated));
        let draft = tool.draft().unwrap();
        assert_rect(draft, NormalizedRect::new(0.0, 70.0 / 300.0, 1.0, 160.0 / 300.0));

        // Rotating back restores the original on-screen rectangle
        tool.rotate_right();
        tool.rotate_right();
        tool.rotate_right();
        tool.set_overlay_box(Some(overlay()));
        assert_rect(tool.draft().unwrap(), NormalizedRect::new(0.1, 0.1, 0.8, 0.8));
    }

    #[test]
    fn test_rotation_in_crop_mode_remaps_committed_crop() {
        let mut tool = tool();
        let crop = NormalizedRect::new(0.0, 0.0, 0.5, 1.0);
        tool.load("img-1", Rotation::ZERO, Some(crop));
        tool.set_natural_size(Size::new(800.0, 400.0));
        let before = stage_to_image_rect(crop, 0.0, &tool.layout()).unwrap();

        tool.enter();
        tool.rotate_right();
        tool.cancel();

        let remapped = tool.crop().unwrap();
        let after = stage_to_image_rect(remapped, 90.0, &tool.layout()).unwrap();
        assert_rect(after, before);
        assert_eq!(tool.port().last_crop(), Some(&Some(remapped)));

        // A second turn starts from the remapped crop
        tool.rotate_right();
        let again = stage_to_image_rect(tool.crop().unwrap(), 180.0, &tool.layout()).unwrap();
        assert_rect(again, before);
    }

    #[test]
    fn test_rotate_right_remaps_committed_crop() {
        let mut tool = tool();
        // Left half of the image becomes the top half after a clockwise turn
        tool.load("img-1", Rotation::ZERO, Some(NormalizedRect::new(0.0, 0.0, 0.5, 1.0)));
        tool.set_natural_size(Size::new(800.0, 400.0));
        tool.rotate_right();
        assert_eq!(tool.rotation(), Rotation::from_degrees(90));
        let crop = tool.crop().unwrap();
        assert_rect(crop, NormalizedRect::new(0.0, 0.0, 1.0, 0.5));
        assert_eq!(tool.port().last_crop(), Some(&Some(crop)));
    }

    #[test]
    fn test_slider_previews_then_commits() {
        let mut tool = cropping_tool();
        tool.slider_pointer_down();
        tool.slider_changed(-30);
        assert_eq!(tool.rotation(), Rotation::from_degrees(330));
        assert_eq!(
            tool.port().last_rotation(),
            Some((Rotation::from_degrees(330), RotationChange::Preview))
        );
        tool.slider_pointer_up();
        assert_eq!(
            tool.port().last_rotation(),
            Some((Rotation::from_degrees(330), RotationChange::Commit))
        );
    }

    #[test]
    fn test_slider_and_crop_gestures_exclude_each_other() {
        let mut tool = cropping_tool();
        tool.slider_pointer_down();
        let (x, y) = client(0.5, 0.5);
        assert_eq!(tool.pointer_down(x, y), CropPhase::Cropping);
        tool.slider_pointer_up();

        assert_eq!(tool.pointer_down(x, y), CropPhase::Moving);
        tool.slider_pointer_down();
        assert!(!tool.rotation_control().is_slider_dragging());
    }

    #[test]
    fn test_slider_change_ignored_during_crop_gesture() {
        let mut tool = cropping_tool();
        let (x, y) = client(0.5, 0.5);
        assert_eq!(tool.pointer_down(x, y), CropPhase::Moving);
        tool.slider_changed(20);
        assert_eq!(tool.rotation(), Rotation::ZERO);
        assert_eq!(tool.rotation_control().signed(), 0);
        assert_eq!(tool.port().last_rotation(), None);

        tool.pointer_up();
        tool.slider_changed(20);
        assert_eq!(tool.rotation(), Rotation::from_degrees(20));
    }

    #[test]
    fn test_rotation_input_commit() {
        let mut tool = cropping_tool();
        tool.rotation_input_focused();
        tool.rotation_input_changed("15");
        tool.rotation_input_committed();
        assert_eq!(tool.rotation(), Rotation::from_degrees(15));
        let events = tool.port_mut().drain();
        assert_eq!(
            events,
            vec![
                PortEvent::Rotation(
                    "img-1".to_string(),
                    Rotation::from_degrees(15),
                    RotationChange::Preview
                ),
                PortEvent::Rotation(
                    "img-1".to_string(),
                    Rotation::from_degrees(15),
                    RotationChange::Commit
                ),
            ]
        );
    }

    #[test]
    fn test_sync_rotation_is_silent() {
        let mut tool = tool();
        tool.sync_rotation(Rotation::from_degrees(180));
        assert_eq!(tool.rotation(), Rotation::from_degrees(180));
        assert_eq!(tool.rotation_control().signed(), 180);
        assert!(tool.port().events.is_empty());
    }

    #[test]
    fn test_load_resets_session() {
        let mut tool = cropping_tool();
        tool.slider_pointer_down();
        tool.load("img-2", Rotation::from_degrees(90), None);
        assert_eq!(tool.id(), "img-2");
        assert_eq!(tool.phase(), CropPhase::Idle);
        assert!(!tool.rotation_control().is_interacting());
        assert_eq!(tool.rotation_control().signed(), 90);
        assert_eq!(tool.port().events, vec![PortEvent::CropMode(false)]);
    }

    #[test]
    fn test_effective_aspect_label() {
        let mut tool = tool();
        assert_eq!(tool.effective_aspect_label().as_deref(), Some("2.00:1"));
        tool.sync_rotation(Rotation::from_degrees(90));
        assert_eq!(tool.effective_aspect_label().as_deref(), Some("2.00:1"));
    }

    // === Property-Based Tests ===

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn client_point() -> impl Strategy<Value = (f64, f64)> {
            (-500.0..1500.0f64, -500.0..1000.0f64)
        }

        fn mode() -> impl Strategy<Value = AspectMode> {
            prop::sample::select(AspectMode::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn draft_stays_inside_stage(
                mode in mode(),
                down in client_point(),
                moves in prop::collection::vec(client_point(), 1..8),
            ) {
                let mut tool = cropping_tool();
                tool.set_aspect_mode(mode);
                tool.pointer_down(down.0, down.1);
                for (x, y) in moves {
                    tool.pointer_move(x, y);
                    let d = tool.draft().unwrap();
                    prop_assert!(d.x >= 0.0 && d.y >= 0.0);
                    prop_assert!(d.right() <= 1.0 + 1e-9);
                    prop_assert!(d.bottom() <= 1.0 + 1e-9);
                    prop_assert!(d.is_committable(MIN_CROP_SIZE - 1e-12));
                }
                tool.pointer_up();
                prop_assert!(tool.apply().is_ok());
            }
        }
    }
}
