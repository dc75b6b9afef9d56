//! Card image loading and caching
//!
//! - Async fetch through an [`ImageSource`] (local files by default)
//! - `spawn_blocking` for decode
//! - `Arc<Vec<u8>>` pixels so every viewer shares one copy

mod cache;
mod source;

pub use cache::*;
pub use source::*;

use std::sync::Arc;
use thiserror::Error;

/// Image load failure.
///
/// `Clone` so that one failed load can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("failed to fetch image {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to decode image {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("image load for {url} ended without a result")]
    Abandoned { url: String },

    #[error("no async runtime to load image {url}")]
    NoRuntime { url: String },
}

impl ImageError {
    /// URL of the image that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. }
            | Self::Decode { url, .. }
            | Self::Abandoned { url }
            | Self::NoRuntime { url } => url,
        }
    }
}

/// Decoded image (RGBA8)
#[derive(Debug, Clone, PartialEq)]
pub struct CardImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl CardImage {
    /// Decode encoded bytes (PNG/JPEG)
    pub fn decode(url: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            url: url.to_string(),
            width,
            height,
            pixels: Arc::new(rgba.into_raw()),
        })
    }
}

/// Neutral grey used when a card image is unavailable
pub const PLACEHOLDER_RGBA: [u8; 4] = [128, 128, 128, 255];

/// What to put on a card face
#[derive(Debug, Clone, PartialEq)]
pub enum CardTexture {
    Image(Arc<CardImage>),
    /// Flat [`PLACEHOLDER_RGBA`]
    Placeholder,
}

impl CardTexture {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// `(width, height)`; the placeholder is a single pixel
    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Image(img) => (img.width, img.height),
            Self::Placeholder => (1, 1),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}
