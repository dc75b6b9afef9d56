//! Pointer drag and hover rotation

use super::{GestureOutcome, HoverMode, RotationGestures};
use crate::rotation::RotationState;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Peak hover tilt, in degrees either side of centre
const HOVER_TILT_DEG: f32 = 10.0;

/// Viewer surface in pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl ViewportRect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// Pointer position relative to the rect, `(0,0)` top-left and `(1,1)`
    /// bottom-right. `None` for a zero-area rect.
    pub fn normalize(&self, pointer: Vec2) -> Option<Vec2> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return None;
        }
        Some((pointer - self.min) / self.size)
    }
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self::from_size(1280.0, 720.0)
    }
}

/// Reserved bottom-left region where on-card controls live
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub width: f32,
    pub height: f32,
}

impl SafeZone {
    pub fn contains(&self, bounds: &ViewportRect, pointer: Vec2) -> bool {
        let from_left = pointer.x - bounds.min.x;
        let from_bottom = bounds.min.y + bounds.size.y - pointer.y;
        (0.0..self.width).contains(&from_left) && (0.0..self.height).contains(&from_bottom)
    }
}

impl Default for SafeZone {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 100.0,
        }
    }
}

/// Drag-to-rotate and hover parallax over the viewer surface
#[derive(Debug, Clone, Default)]
pub struct MouseController {
    safe_zone: SafeZone,
    bounds: ViewportRect,
    /// Pointer minus rotation at drag start, `(px - ry, py - rx)`
    drag_origin: Option<Vec2>,
}

impl MouseController {
    pub fn new(safe_zone: SafeZone, bounds: ViewportRect) -> Self {
        Self {
            safe_zone,
            bounds,
            drag_origin: None,
        }
    }

    pub fn set_bounds(&mut self, bounds: ViewportRect) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> ViewportRect {
        self.bounds
    }

    pub fn in_safe_zone(&self, pointer: Vec2) -> bool {
        self.safe_zone.contains(&self.bounds, pointer)
    }
}

impl RotationGestures for MouseController {
    fn on_drag_start(&mut self, pointer: Vec2, current: RotationState) -> GestureOutcome {
        if self.in_safe_zone(pointer) {
            tracing::trace!("drag start in safe zone ignored at {:?}", pointer);
            return GestureOutcome::NONE;
        }

        self.drag_origin = Some(Vec2::new(pointer.x - current.y, pointer.y - current.x));
        tracing::debug!("drag started at {:?}", pointer);

        GestureOutcome {
            rotation: None,
            disable_auto_rotate: true,
        }
    }

    fn on_drag(&mut self, pointer: Vec2) -> GestureOutcome {
        let Some(origin) = self.drag_origin else {
            return GestureOutcome::NONE;
        };
        if self.in_safe_zone(pointer) {
            return GestureOutcome::NONE;
        }

        // 1 px of travel = 1 degree
        GestureOutcome::rotate(RotationState::new(pointer.y - origin.y, pointer.x - origin.x))
    }

    fn on_drag_end(&mut self) -> GestureOutcome {
        if self.drag_origin.take().is_some() {
            tracing::debug!("drag ended");
        }
        GestureOutcome::NONE
    }

    fn on_hover(&mut self, pointer: Vec2, mode: HoverMode) -> GestureOutcome {
        if self.drag_origin.is_some()
            || !mode.allow_rotation
            || mode.auto_rotating
            || self.in_safe_zone(pointer)
        {
            return GestureOutcome::NONE;
        }

        match self.bounds.normalize(pointer) {
            Some(n) => GestureOutcome::rotate(RotationState::new(
                (n.y - 0.5) * 2.0 * HOVER_TILT_DEG,
                (n.x - 0.5) * -2.0 * HOVER_TILT_DEG,
            )),
            None => GestureOutcome::NONE,
        }
    }

    fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    fn resize(&mut self, bounds: ViewportRect) {
        self.set_bounds(bounds);
    }
}
