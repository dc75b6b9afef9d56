//! Writers of the card rotation
//!
//! Two sources move the card: the auto-rotation ticker while the viewer is
//! idle, and the pointer while the user drags or hovers. The viewer root
//! keeps them exclusive; only one writes at any time.

mod auto_rotate;
mod mouse;

pub use auto_rotate::*;
pub use mouse::*;

use crate::rotation::RotationState;
use glam::Vec2;

/// What a gesture asks the viewer to do
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureOutcome {
    /// New rotation to publish, if any
    pub rotation: Option<RotationState>,
    /// Turn auto-rotation off
    pub disable_auto_rotate: bool,
}

impl GestureOutcome {
    pub const NONE: Self = Self {
        rotation: None,
        disable_auto_rotate: false,
    };

    pub fn rotate(rotation: RotationState) -> Self {
        Self {
            rotation: Some(rotation),
            disable_auto_rotate: false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.rotation.is_none() && !self.disable_auto_rotate
    }
}

/// Viewer flags a hover gesture depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverMode {
    pub allow_rotation: bool,
    pub auto_rotating: bool,
}

/// Pointer gestures that rotate a card
pub trait RotationGestures {
    /// Button pressed at `pointer` while the card shows `current`
    fn on_drag_start(&mut self, pointer: Vec2, current: RotationState) -> GestureOutcome;

    /// Pointer moved with the button held
    fn on_drag(&mut self, pointer: Vec2) -> GestureOutcome;

    /// Button released
    fn on_drag_end(&mut self) -> GestureOutcome;

    /// Pointer moved with no button held
    fn on_hover(&mut self, pointer: Vec2, mode: HoverMode) -> GestureOutcome;

    fn is_dragging(&self) -> bool;

    /// Viewer surface moved or resized
    fn resize(&mut self, _bounds: ViewportRect) {}
}
