//! Front/back face visibility
//!
//! Maps a [`RotationState`] to an opacity and stacking order for each card
//! face. Two policies exist:
//!
//! - [`TransitionPolicy::Crossfade`]: the back face fades in over a 30° band
//!   on each side of the back half (`[90°,120°]` in, `[240°,270°]` out).
//!   The front face switches with a hard cut at 90°/270° on the Y axis.
//! - [`TransitionPolicy::Solid`]: both faces switch as booleans.
//!
//! The front cut does not line up with the back fade (at 100° the front is
//! gone while the back is a third in). Downstream transitions are timed
//! against this, so it is kept as-is.

use crate::rotation::RotationState;
use serde::{Deserialize, Serialize};

/// Start of the back half, in normalized degrees
pub const BACK_BAND_START: f32 = 90.0;
/// End of the back half, in normalized degrees
pub const BACK_BAND_END: f32 = 270.0;
/// Width of each crossfade ramp
pub const FADE_BAND: f32 = 30.0;

/// Stacking order for a face on top (either policy)
pub const Z_RAISED: i32 = 25;
/// Stacking order for a hidden face under crossfade
pub const Z_LOWERED: i32 = 15;
/// Stacking order for a hidden face under the solid policy
pub const Z_SOLID_HIDDEN: i32 = 5;

/// Back opacity above which the back face is raised
const BACK_RAISE_THRESHOLD: f32 = 0.3;

/// Face transition policy
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Linear fade across a 30° band
    #[default]
    Crossfade,
    /// Boolean switch, no fade
    Solid,
}

/// Opacity and stacking order of one face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceVisibility {
    pub opacity: f32,
    pub z_index: i32,
}

/// Visibility of both card faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardFaces {
    pub front: FaceVisibility,
    pub back: FaceVisibility,
}

/// Wrap an angle into `[0, 360)`.
///
/// Non-finite input stays non-finite (NaN).
#[inline]
pub fn normalize_degrees(value: f32) -> f32 {
    ((value % 360.0) + 360.0) % 360.0
}

/// Whether a normalized angle lies in the back half `[90, 270]`
#[inline]
fn in_back_band(angle: f32) -> bool {
    (BACK_BAND_START..=BACK_BAND_END).contains(&angle)
}

/// Crossfade opacity contributed by one normalized axis
pub fn axis_back_opacity(angle: f32) -> f32 {
    let fade_in_end = BACK_BAND_START + FADE_BAND;
    let fade_out_start = BACK_BAND_END - FADE_BAND;

    if !in_back_band(angle) {
        0.0
    } else if angle <= fade_in_end {
        (angle - BACK_BAND_START) / FADE_BAND
    } else if angle < fade_out_start {
        1.0
    } else {
        (BACK_BAND_END - angle) / FADE_BAND
    }
}

/// Whether the front face shows for a normalized Y angle.
///
/// Written as "not strictly inside the back half" so that NaN falls back to
/// a visible front face.
#[inline]
fn front_visible(y: f32) -> bool {
    !(y > BACK_BAND_START && y < BACK_BAND_END)
}

/// Resolve both faces for a rotation under the given policy
pub fn resolve_faces(rotation: RotationState, policy: TransitionPolicy) -> CardFaces {
    let x = normalize_degrees(rotation.x);
    let y = normalize_degrees(rotation.y);

    match policy {
        TransitionPolicy::Crossfade => {
            let back_opacity = axis_back_opacity(x).max(axis_back_opacity(y));
            let front_on = front_visible(y);
            CardFaces {
                front: FaceVisibility {
                    opacity: if front_on { 1.0 } else { 0.0 },
                    z_index: if front_on { Z_RAISED } else { Z_LOWERED },
                },
                back: FaceVisibility {
                    opacity: back_opacity,
                    z_index: if back_opacity > BACK_RAISE_THRESHOLD {
                        Z_RAISED
                    } else {
                        Z_LOWERED
                    },
                },
            }
        }
        TransitionPolicy::Solid => {
            let back_on = in_back_band(x) || in_back_band(y);
            let solid = |on: bool| FaceVisibility {
                opacity: if on { 1.0 } else { 0.0 },
                z_index: if on { Z_RAISED } else { Z_SOLID_HIDDEN },
            };
            CardFaces {
                front: solid(!back_on),
                back: solid(back_on),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(x: f32, y: f32) -> CardFaces {
        resolve_faces(RotationState::new(x, y), TransitionPolicy::Crossfade)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(-720.0), 0.0);
        assert!(normalize_degrees(f32::NAN).is_nan());
        assert!(normalize_degrees(f32::INFINITY).is_nan());
        for v in [-1e-7_f32, -0.0, 359.99999] {
            let n = normalize_degrees(v);
            assert!((0.0..360.0).contains(&n), "{v} -> {n}");
        }
    }

    #[test]
    fn test_back_facing_example() {
        let f = faces(0.0, 180.0);
        assert_eq!(f.back.opacity, 1.0);
        assert_eq!(f.back.z_index, 25);
        assert_eq!(f.front.opacity, 0.0);
        assert_eq!(f.front.z_index, 15);
    }

    #[test]
    fn test_fade_in_example_shows_asymmetry() {
        let f = faces(0.0, 100.0);
        assert!((f.back.opacity - 1.0 / 3.0).abs() < 1e-5);
        assert_eq!(f.back.z_index, 25);
        // Front already cut at 90 while the back is only a third in
        assert_eq!(f.front.opacity, 0.0);
    }

    #[test]
    fn test_front_facing() {
        for y in [0.0, 45.0, 90.0, 270.0, 300.0, 359.0, -30.0, 720.0] {
            let f = faces(0.0, y);
            assert_eq!(f.front.opacity, 1.0, "y = {y}");
            assert_eq!(f.front.z_index, 25, "y = {y}");
            assert_eq!(f.back.opacity, 0.0, "y = {y}");
            assert_eq!(f.back.z_index, 15, "y = {y}");
        }
    }

    #[test]
    fn test_back_opacity_profile() {
        let mut prev = 0.0;
        let mut y = 90.0;
        while y <= 120.0 {
            let o = faces(0.0, y).back.opacity;
            assert!(o >= prev, "not non-decreasing at {y}");
            prev = o;
            y += 0.5;
        }

        let mut y = 120.5;
        while y < 240.0 {
            assert_eq!(faces(0.0, y).back.opacity, 1.0, "y = {y}");
            y += 0.5;
        }

        let mut prev = 1.0;
        let mut y = 240.0;
        while y <= 270.0 {
            let o = faces(0.0, y).back.opacity;
            assert!(o <= prev, "not non-increasing at {y}");
            prev = o;
            y += 0.5;
        }

        let mut y = 0.0;
        while y < 360.0 {
            if !(90.0..=270.0).contains(&y) {
                assert_eq!(faces(0.0, y).back.opacity, 0.0, "y = {y}");
            }
            y += 0.5;
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(axis_back_opacity(90.0), 0.0);
        assert_eq!(axis_back_opacity(120.0), 1.0);
        assert_eq!(axis_back_opacity(240.0), 1.0);
        assert_eq!(axis_back_opacity(270.0), 0.0);
        assert!((axis_back_opacity(255.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_back_takes_max_of_axes() {
        let f = faces(180.0, 100.0);
        assert_eq!(f.back.opacity, 1.0);

        let f = faces(105.0, 0.0);
        assert!((f.back.opacity - 0.5).abs() < 1e-5);
        // Front follows Y only, so an X flip alone leaves it up
        assert_eq!(f.front.opacity, 1.0);
    }

    #[test]
    fn test_at_most_one_face_dominates_on_y() {
        let mut y = -720.0;
        while y < 720.0 {
            let f = faces(0.0, y);
            let dominant = [f.front.opacity, f.back.opacity]
                .iter()
                .filter(|o| **o > 0.5)
                .count();
            assert!(dominant <= 1, "y = {y}");
            y += 1.0;
        }
    }

    #[test]
    fn test_solid_is_exclusive() {
        let mut y = -360.0;
        while y < 720.0 {
            for x in [0.0, 45.0, 100.0, 180.0, 300.0] {
                let f = resolve_faces(RotationState::new(x, y), TransitionPolicy::Solid);
                assert!(
                    !(f.front.z_index == 25 && f.back.z_index == 25),
                    "both raised at ({x}, {y})"
                );
                assert!(f.front.opacity == 0.0 || f.front.opacity == 1.0);
                assert!(f.back.opacity == 0.0 || f.back.opacity == 1.0);
                assert_eq!(f.front.opacity + f.back.opacity, 1.0);
            }
            y += 2.5;
        }
    }

    #[test]
    fn test_solid_z_indices() {
        let f = resolve_faces(RotationState::new(0.0, 180.0), TransitionPolicy::Solid);
        assert_eq!(f.back, FaceVisibility { opacity: 1.0, z_index: 25 });
        assert_eq!(f.front, FaceVisibility { opacity: 0.0, z_index: 5 });
    }

    #[test]
    fn test_nan_falls_back_to_front() {
        let f = faces(f32::NAN, f32::NAN);
        assert_eq!(f.front.opacity, 1.0);
        assert_eq!(f.back.opacity, 0.0);

        let f = resolve_faces(
            RotationState::new(f32::INFINITY, f32::NEG_INFINITY),
            TransitionPolicy::Solid,
        );
        assert_eq!(f.front.opacity, 1.0);
    }
}
