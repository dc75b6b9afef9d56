//! Cardshow View: two-sided trading card viewer
//!
//! Models a card's 3D orientation and derives everything a renderer needs
//! from it: which face is visible, AR depth effects, and the textures for
//! each face.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use cardshow_view::{CardViewer, ImageCache, ViewerConfig, ViewerEvent};
//! use glam::Vec2;
//!
//! # async fn run() {
//! let cache = ImageCache::default();
//! let faces = cardshow_view::load_card_faces(&cache, "cards/front.png", "cards/back.png").await;
//!
//! let mut viewer = CardViewer::new(ViewerConfig::showcase());
//! viewer.handle_event(ViewerEvent::PointerDown(Vec2::new(640.0, 360.0)));
//! viewer.handle_event(ViewerEvent::PointerMove(Vec2::new(820.0, 360.0)));
//!
//! let frame = viewer.frame();
//! let uniforms = frame.uniforms();
//! # let _ = (faces, uniforms);
//! # }
//! ```

pub mod app;
pub mod config;
pub mod controls;
pub mod effects;
pub mod images;
pub mod rotation;
pub mod stats;

// Re-export key types
pub use app::{CardFrame, CardViewer, ViewerEvent, ViewerState};
pub use config::ViewerConfig;
pub use controls::{AutoRotateDriver, AutoRotationManager, MouseController, RotationGestures};
pub use effects::{compose_ar_effects, resolve_faces, ArEffects, CardFaces, TransitionPolicy};
pub use images::{CardImage, CardTexture, FsSource, ImageCache, ImageError, ImageSource};
pub use rotation::{Rotation, RotationState};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Textures for both faces of one card
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTextures {
    pub front: CardTexture,
    pub back: CardTexture,
}

/// Load both faces concurrently, each falling back to the placeholder
pub async fn load_card_faces<S: ImageSource>(
    cache: &ImageCache<S>,
    front: &str,
    back: &str,
) -> FaceTextures {
    let (front, back) = tokio::join!(
        cache.texture_or_placeholder(front),
        cache.texture_or_placeholder(back)
    );
    FaceTextures { front, back }
}
