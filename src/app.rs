//! Card viewer root: owns the rotation and routes input to its writers

use crate::config::ViewerConfig;
use crate::controls::{
    AutoRotationManager, GestureOutcome, HoverMode, MouseController, RotationGestures, ViewportRect,
};
use crate::effects::{compose_ar_effects, resolve_faces, ArEffects, CardFaces, CardUniforms, TransitionPolicy};
use crate::rotation::{Rotation, RotationState};
use crate::stats::StatsCollector;
use glam::Vec2;
use serde::Serialize;
use tokio::sync::watch;

/// Input delivered to the viewer by its host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    /// Primary button pressed
    PointerDown(Vec2),
    /// Pointer moved, with or without the button held
    PointerMove(Vec2),
    /// Primary button released
    PointerUp,
    /// Wheel steps, positive zooms in
    Scroll(f32),
    /// Viewer surface moved or resized
    Resized(ViewportRect),
    SetAutoRotate(bool),
    SetZoom(f32),
    SetEffectIntensity(f32),
    SetTransition(TransitionPolicy),
    SetAllowRotation(bool),
    /// Rotation back to `{0, 0}`, zoom back to the initial value
    ResetView,
    /// One display frame
    Tick { now_ms: f64 },
}

/// Viewer flags and levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewerState {
    pub zoom: f32,
    pub auto_rotate: bool,
    pub effect_intensity: f32,
    pub transition: TransitionPolicy,
    pub allow_rotation: bool,
}

impl ViewerState {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            zoom: config.clamp_zoom(config.initial_zoom),
            auto_rotate: config.auto_rotate,
            effect_intensity: config.effect_intensity,
            transition: config.transition,
            allow_rotation: config.allow_rotation,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardFrame {
    pub rotation: RotationState,
    pub faces: CardFaces,
    pub ar: ArEffects,
}

impl CardFrame {
    pub fn uniforms(&self) -> CardUniforms {
        CardUniforms::new(&self.faces, &self.ar)
    }
}

/// One mounted card viewer.
///
/// Rotation is written by exactly one source at a time: the auto-rotation
/// ticker while `auto_rotate && !dragging`, the gesture controller
/// otherwise. Dropping the viewer stops the ticker.
#[derive(Debug)]
pub struct CardViewer<G: RotationGestures = MouseController> {
    config: ViewerConfig,
    state: ViewerState,
    rotation: Rotation,
    gestures: G,
    auto: AutoRotationManager,
    stats: StatsCollector,
}

impl CardViewer<MouseController> {
    pub fn new(config: ViewerConfig) -> Self {
        let gestures = MouseController::new(config.safe_zone, ViewportRect::default());
        Self::with_gestures(config, gestures)
    }
}

impl<G: RotationGestures> CardViewer<G> {
    /// Viewer with a custom gesture controller
    pub fn with_gestures(config: ViewerConfig, gestures: G) -> Self {
        let rotation = Rotation::default();
        let auto = AutoRotationManager::new(
            rotation.clone(),
            config.auto_rotate_driver,
            config.frame_interval(),
        );

        let mut viewer = Self {
            state: ViewerState::from_config(&config),
            config,
            rotation,
            gestures,
            auto,
            stats: StatsCollector::new(),
        };
        viewer.sync_auto_rotation();

        tracing::info!(
            "Card viewer mounted (zoom {:.2}, auto-rotate {}, {:?})",
            viewer.state.zoom,
            viewer.state.auto_rotate,
            viewer.state.transition
        );
        viewer
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Handle to the owned rotation (read, subscribe)
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Notified whenever the rotation changes
    pub fn subscribe(&self) -> watch::Receiver<RotationState> {
        self.rotation.subscribe()
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto.is_running()
    }

    /// Average frame rate over recent ticks
    pub fn fps(&self) -> f32 {
        self.stats.fps()
    }

    /// Current derived visuals
    pub fn frame(&self) -> CardFrame {
        let rotation = self.rotation.get();
        CardFrame {
            rotation,
            faces: resolve_faces(rotation, self.state.transition),
            ar: compose_ar_effects(self.state.zoom, rotation, self.state.effect_intensity),
        }
    }

    /// Apply one input event. Returns whether a redraw is needed.
    pub fn handle_event(&mut self, event: ViewerEvent) -> bool {
        let before = (self.rotation.get(), self.state);

        match event {
            ViewerEvent::PointerDown(pointer) => {
                // No tick may land between reading the rotation and recording
                // the drag origin; the sync below restarts it if no drag began
                self.auto.sync(false);
                let outcome = self.gestures.on_drag_start(pointer, self.rotation.get());
                self.apply(outcome);
            }
            ViewerEvent::PointerMove(pointer) => {
                let outcome = if self.gestures.is_dragging() {
                    self.gestures.on_drag(pointer)
                } else {
                    let mode = HoverMode {
                        allow_rotation: self.state.allow_rotation,
                        auto_rotating: self.state.auto_rotate,
                    };
                    self.gestures.on_hover(pointer, mode)
                };
                self.apply(outcome);
            }
            ViewerEvent::PointerUp => {
                let outcome = self.gestures.on_drag_end();
                self.apply(outcome);
            }
            ViewerEvent::Scroll(delta) => self.handle_scroll(delta),
            ViewerEvent::Resized(bounds) => self.gestures.resize(bounds),
            ViewerEvent::SetAutoRotate(on) => {
                self.state.auto_rotate = on;
                tracing::info!("Auto-rotate: {}", on);
            }
            ViewerEvent::SetZoom(zoom) => self.state.zoom = self.config.clamp_zoom(zoom),
            ViewerEvent::SetEffectIntensity(intensity) => self.state.effect_intensity = intensity,
            ViewerEvent::SetTransition(policy) => {
                self.state.transition = policy;
                tracing::info!("Transition policy: {:?}", policy);
            }
            ViewerEvent::SetAllowRotation(allow) => self.state.allow_rotation = allow,
            ViewerEvent::ResetView => {
                self.rotation.reset();
                self.state.zoom = self.config.clamp_zoom(self.config.initial_zoom);
                tracing::info!("View reset");
            }
            ViewerEvent::Tick { now_ms } => {
                self.stats.record_frame();
                self.auto.tick(now_ms);
            }
        }

        self.sync_auto_rotation();
        before != (self.rotation.get(), self.state)
    }

    fn handle_scroll(&mut self, delta: f32) {
        let factor = self.config.scroll_zoom_factor;
        let zoom = if delta > 0.0 {
            self.state.zoom * factor
        } else if delta < 0.0 {
            self.state.zoom / factor
        } else {
            self.state.zoom
        };
        self.state.zoom = self.config.clamp_zoom(zoom);
        tracing::debug!("Zoom: {:.3}", self.state.zoom);
    }

    fn apply(&mut self, outcome: GestureOutcome) {
        if outcome.disable_auto_rotate && self.state.auto_rotate {
            self.state.auto_rotate = false;
            tracing::debug!("Auto-rotate disabled by drag");
        }
        // Stop the ticker before publishing a pointer rotation
        self.sync_auto_rotation();
        if let Some(rotation) = outcome.rotation {
            self.rotation.set(rotation);
        }
    }

    fn sync_auto_rotation(&mut self) {
        let should_run = self.state.auto_rotate && !self.gestures.is_dragging();
        self.auto.sync(should_run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::AutoRotateDriver;
    use std::time::Duration;

    fn host_config() -> ViewerConfig {
        ViewerConfig {
            auto_rotate_driver: AutoRotateDriver::Host,
            ..Default::default()
        }
    }

    fn viewer(config: ViewerConfig) -> CardViewer {
        let mut v = CardViewer::new(config);
        v.handle_event(ViewerEvent::Resized(ViewportRect::from_size(800.0, 600.0)));
        v
    }

    #[test]
    fn test_mounts_front_facing() {
        let v = viewer(host_config());
        let frame = v.frame();
        assert_eq!(frame.rotation, RotationState::ZERO);
        assert_eq!(frame.faces.front.opacity, 1.0);
        assert_eq!(frame.faces.back.opacity, 0.0);
        assert!(!frame.ar.is_ar_mode);
        assert!(v.is_auto_rotating());
    }

    #[test]
    fn test_drag_takes_over_from_auto_rotation() {
        let mut v = viewer(host_config());

        assert!(v.handle_event(ViewerEvent::Tick { now_ms: 0.0 }));
        assert_eq!(v.rotation().get(), RotationState::new(0.0, 0.5));

        v.handle_event(ViewerEvent::PointerDown(Vec2::new(400.0, 300.0)));
        assert!(v.is_dragging());
        assert!(!v.state().auto_rotate);
        assert!(!v.is_auto_rotating());

        assert!(!v.handle_event(ViewerEvent::Tick { now_ms: 0.0 }));
        assert_eq!(v.rotation().get(), RotationState::new(0.0, 0.5));

        v.handle_event(ViewerEvent::PointerMove(Vec2::new(450.0, 300.0)));
        assert_eq!(v.rotation().get(), RotationState::new(0.0, 50.5));

        v.handle_event(ViewerEvent::PointerUp);
        assert!(!v.is_dragging());
        // Released drag leaves auto-rotate off
        assert!(!v.state().auto_rotate);
        v.handle_event(ViewerEvent::Tick { now_ms: 0.0 });
        assert_eq!(v.rotation().get().y, 50.5);

        v.handle_event(ViewerEvent::SetAutoRotate(true));
        v.handle_event(ViewerEvent::Tick { now_ms: 0.0 });
        assert_eq!(v.rotation().get().y, 51.0);
    }

    #[test]
    fn test_drag_to_back_face() {
        let mut v = viewer(ViewerConfig {
            auto_rotate: false,
            ..host_config()
        });
        v.handle_event(ViewerEvent::PointerDown(Vec2::new(400.0, 300.0)));
        v.handle_event(ViewerEvent::PointerMove(Vec2::new(580.0, 300.0)));

        let frame = v.frame();
        assert_eq!(frame.rotation.y, 180.0);
        assert_eq!(frame.faces.back.opacity, 1.0);
        assert_eq!(frame.faces.back.z_index, 25);
        assert_eq!(frame.faces.front.opacity, 0.0);
    }

    #[test]
    fn test_hover_only_when_idle() {
        let mut v = viewer(host_config());
        let top_right = Vec2::new(800.0, 0.0);

        assert!(!v.handle_event(ViewerEvent::PointerMove(top_right)));
        assert_eq!(v.rotation().get(), RotationState::ZERO);

        v.handle_event(ViewerEvent::SetAutoRotate(false));
        assert!(v.handle_event(ViewerEvent::PointerMove(top_right)));
        assert_eq!(v.rotation().get(), RotationState::new(-10.0, -10.0));

        v.handle_event(ViewerEvent::SetAllowRotation(false));
        v.handle_event(ViewerEvent::PointerMove(Vec2::new(400.0, 300.0)));
        assert_eq!(v.rotation().get(), RotationState::new(-10.0, -10.0));
    }

    #[test]
    fn test_safe_zone_blocks_drag() {
        let mut v = viewer(host_config());
        v.handle_event(ViewerEvent::PointerDown(Vec2::new(40.0, 580.0)));
        assert!(!v.is_dragging());
        assert!(v.state().auto_rotate);
        assert!(v.is_auto_rotating());
    }

    #[test]
    fn test_scroll_into_ar() {
        let mut v = viewer(host_config());
        for _ in 0..3 {
            v.handle_event(ViewerEvent::Scroll(1.0));
        }
        assert!((v.state().zoom - 1.331).abs() < 1e-4);
        assert!(v.frame().ar.is_ar_mode);

        for _ in 0..50 {
            v.handle_event(ViewerEvent::Scroll(1.0));
        }
        assert_eq!(v.state().zoom, 3.0);

        for _ in 0..50 {
            v.handle_event(ViewerEvent::Scroll(-1.0));
        }
        assert_eq!(v.state().zoom, 0.5);
    }

    #[test]
    fn test_set_zoom_high_ar() {
        let mut v = viewer(host_config());
        v.handle_event(ViewerEvent::SetZoom(2.0));
        v.handle_event(ViewerEvent::SetEffectIntensity(0.5));
        let ar = v.frame().ar;
        assert!(ar.is_ar_mode && ar.is_high_ar_mode);
        assert_eq!(ar.z_index, 100);
    }

    #[test]
    fn test_nan_zoom_is_tolerated() {
        let mut v = viewer(host_config());
        v.handle_event(ViewerEvent::SetZoom(f32::NAN));
        let frame = v.frame();
        assert!(!frame.ar.is_ar_mode);
    }

    #[test]
    fn test_solid_transition() {
        let mut v = viewer(ViewerConfig {
            auto_rotate: false,
            ..host_config()
        });
        v.handle_event(ViewerEvent::SetTransition(TransitionPolicy::Solid));
        v.rotation().set(RotationState::new(0.0, 100.0));

        let faces = v.frame().faces;
        assert_eq!(faces.back.opacity, 1.0);
        assert_eq!(faces.front.opacity, 0.0);
        assert_eq!(faces.front.z_index, 5);
    }

    #[test]
    fn test_reset_view() {
        let mut v = viewer(ViewerConfig {
            auto_rotate: false,
            ..host_config()
        });
        v.rotation().set(RotationState::new(33.0, 720.0));
        v.handle_event(ViewerEvent::SetZoom(2.5));

        assert!(v.handle_event(ViewerEvent::ResetView));
        assert_eq!(v.rotation().get(), RotationState::ZERO);
        assert_eq!(v.state().zoom, 1.0);
    }

    #[test]
    fn test_frame_serializes() {
        let v = viewer(host_config());
        let json = serde_json::to_value(v.frame()).unwrap();
        assert_eq!(json["faces"]["front"]["z_index"], 25);
        assert_eq!(json["ar"]["is_ar_mode"], false);
        assert_eq!(v.frame().uniforms().front_opacity, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_origin_matches_rotation_at_press() {
        let mut v = viewer(ViewerConfig::default());
        let mut rx = v.subscribe();
        rx.changed().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let press = Vec2::new(400.0, 300.0);
        v.handle_event(ViewerEvent::PointerDown(press));
        let at_press = v.rotation().get();
        assert!(!v.is_auto_rotating());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(v.rotation().get(), at_press);

        v.handle_event(ViewerEvent::PointerMove(press));
        assert_eq!(v.rotation().get(), at_press);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_zone_press_keeps_timer_spinning() {
        let mut v = viewer(ViewerConfig::default());
        v.handle_event(ViewerEvent::PointerDown(Vec2::new(40.0, 580.0)));
        assert!(v.is_auto_rotating());

        let before = v.rotation().get();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(v.rotation().get().y > before.y);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_viewer_spins_and_unmount_stops_it() {
        let v = CardViewer::new(ViewerConfig::default());
        let rotation = v.rotation().clone();
        let mut rx = v.subscribe();

        rx.changed().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rotation.get().y > 0.0);

        drop(v);
        let at_unmount = rotation.get();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rotation.get(), at_unmount);
    }
}
