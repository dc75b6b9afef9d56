//! Shader-side packing of the per-frame card effects

use super::ar::ArEffects;
use super::visibility::CardFaces;

/// Uniform block for the card shader.
///
/// Layout is std140-friendly: every field is 4 bytes and the struct is a
/// multiple of 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CardUniforms {
    pub front_opacity: f32,
    pub back_opacity: f32,
    pub front_z: i32,
    pub back_z: i32,

    pub perspective: f32,
    pub translate_z: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,

    pub scale: f32,
    pub shadow_offset_y: f32,
    pub shadow_blur: f32,
    pub shadow_opacity: f32,

    pub glow_alpha: f32,
    pub glow_spread: f32,
    pub background_blur: f32,
    pub ar_mode: u32,

    pub parallax: [f32; 2],
    _padding: [f32; 2],
}

impl CardUniforms {
    pub fn new(faces: &CardFaces, ar: &ArEffects) -> Self {
        let (glow_alpha, glow_spread) = ar
            .glow
            .map(|g| (g.alpha, g.spread_px))
            .unwrap_or((0.0, 0.0));

        let ar_mode = match (ar.is_ar_mode, ar.is_high_ar_mode) {
            (_, true) => 2,
            (true, false) => 1,
            _ => 0,
        };

        Self {
            front_opacity: faces.front.opacity,
            back_opacity: faces.back.opacity,
            front_z: faces.front.z_index,
            back_z: faces.back.z_index,
            perspective: ar.transform.perspective_px,
            translate_z: ar.transform.translate_z_px,
            rotate_x: ar.transform.rotate_x_deg.to_radians(),
            rotate_y: ar.transform.rotate_y_deg.to_radians(),
            scale: ar.transform.scale,
            shadow_offset_y: ar.shadow.offset_y_px,
            shadow_blur: ar.shadow.blur_px,
            shadow_opacity: ar.shadow.opacity,
            glow_alpha,
            glow_spread,
            background_blur: ar.background_blur_px,
            ar_mode,
            parallax: ar.parallax.to_array(),
            _padding: [0.0; 2],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for CardUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}
