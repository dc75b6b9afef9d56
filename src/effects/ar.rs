//! AR depth cues
//!
//! Past a zoom of 1.2 the card is "lifted" off the page: it gains depth
//! (perspective and translateZ), a stronger shadow, a glow, and the
//! background behind it blurs. Everything here is a pure function of
//! `(zoom, rotation, effect_intensity)`.

use crate::rotation::RotationState;
use glam::Vec2;
use serde::Serialize;

/// Zoom above which AR mode is active (exclusive)
pub const AR_ZOOM_THRESHOLD: f32 = 1.2;
/// Zoom above which high AR mode is active (exclusive)
pub const HIGH_AR_ZOOM_THRESHOLD: f32 = 1.8;

pub const Z_INDEX_NORMAL: i32 = 10;
pub const Z_INDEX_AR: i32 = 60;
pub const Z_INDEX_HIGH_AR: i32 = 100;

const BASE_PERSPECTIVE_PX: f32 = 1000.0;
const PERSPECTIVE_PER_ZOOM_PX: f32 = 500.0;
const TRANSLATE_Z_PER_ZOOM_PX: f32 = 50.0;
const AR_ROTATION_FACTOR: f32 = 0.8;
const NORMAL_ROTATION_FACTOR: f32 = 0.5;
const MAX_BACKGROUND_BLUR_PX: f32 = 8.0;
const BACKGROUND_BLUR_PER_ZOOM_PX: f32 = 3.0;
const MAX_GLOW_ALPHA: f32 = 0.6;
const MAX_SHADOW_OPACITY: f32 = 0.8;
const PARALLAX_DAMPING: f32 = 0.1;

/// Glow colour (RGB)
pub const GLOW_COLOR: [u8; 3] = [100, 200, 255];

/// 3D transform applied to the card
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform3d {
    pub perspective_px: f32,
    pub translate_z_px: f32,
    pub rotate_x_deg: f32,
    pub rotate_y_deg: f32,
    pub scale: f32,
}

impl Transform3d {
    /// CSS `transform` equivalent
    pub fn to_css(&self) -> String {
        format!(
            "perspective({}px) translateZ({}px) rotateX({}deg) rotateY({}deg) scale({})",
            self.perspective_px, self.translate_z_px, self.rotate_x_deg, self.rotate_y_deg, self.scale
        )
    }
}

/// Drop shadow under the card
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub offset_y_px: f32,
    pub blur_px: f32,
    pub opacity: f32,
}

impl Shadow {
    pub fn to_css(&self) -> String {
        format!(
            "0 {}px {}px rgba(0, 0, 0, {})",
            self.offset_y_px, self.blur_px, self.opacity
        )
    }
}

/// Glow around the card (AR mode only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Glow {
    /// Raw intensity, unbounded
    pub intensity: f32,
    /// Colour alpha, intensity clamped to 0.6
    pub alpha: f32,
    pub spread_px: f32,
}

impl Glow {
    pub fn to_css(&self) -> String {
        let [r, g, b] = GLOW_COLOR;
        format!("0 0 {}px rgba({r}, {g}, {b}, {})", self.spread_px, self.alpha)
    }
}

/// Everything derived from zoom, rotation and effect intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArEffects {
    pub is_ar_mode: bool,
    pub is_high_ar_mode: bool,
    pub z_index: i32,
    pub transform: Transform3d,
    pub shadow: Shadow,
    pub glow: Option<Glow>,
    pub background_blur_px: f32,
    /// Background layer drift, damped relative to the card rotation
    pub parallax: Vec2,
}

/// Derive the AR bundle.
///
/// `effect_intensity` is expected in `[0, 1]` but is not validated; NaN or
/// out-of-range input yields odd numbers, never a panic.
pub fn compose_ar_effects(zoom: f32, rotation: RotationState, effect_intensity: f32) -> ArEffects {
    let is_ar_mode = zoom > AR_ZOOM_THRESHOLD;
    let is_high_ar_mode = zoom > HIGH_AR_ZOOM_THRESHOLD;
    let lift = if is_ar_mode { zoom - AR_ZOOM_THRESHOLD } else { 0.0 };

    let z_index = if is_high_ar_mode {
        Z_INDEX_HIGH_AR
    } else if is_ar_mode {
        Z_INDEX_AR
    } else {
        Z_INDEX_NORMAL
    };

    let rotation_factor = if is_ar_mode {
        AR_ROTATION_FACTOR
    } else {
        NORMAL_ROTATION_FACTOR
    };

    let transform = Transform3d {
        perspective_px: BASE_PERSPECTIVE_PX + lift * PERSPECTIVE_PER_ZOOM_PX,
        translate_z_px: lift * TRANSLATE_Z_PER_ZOOM_PX,
        rotate_x_deg: rotation.x * rotation_factor,
        rotate_y_deg: rotation.y * rotation_factor,
        scale: zoom,
    };

    let shadow = Shadow {
        offset_y_px: 10.0 + zoom * 10.0,
        blur_px: 20.0 + zoom * 15.0 + effect_intensity * 20.0,
        opacity: (0.25 + (zoom - 1.0) * 0.1 + effect_intensity * 0.2).clamp(0.0, MAX_SHADOW_OPACITY),
    };

    let glow = is_ar_mode.then(|| {
        let intensity = lift * 0.5 + effect_intensity * 0.3;
        Glow {
            intensity,
            alpha: intensity.min(MAX_GLOW_ALPHA),
            spread_px: 20.0 + intensity * 30.0,
        }
    });

    let background_blur_px = (lift * BACKGROUND_BLUR_PER_ZOOM_PX).min(MAX_BACKGROUND_BLUR_PX);

    ArEffects {
        is_ar_mode,
        is_high_ar_mode,
        z_index,
        transform,
        shadow,
        glow,
        background_blur_px,
        parallax: Vec2::new(rotation.x, rotation.y) * PARALLAX_DAMPING,
    }
}
