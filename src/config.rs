//! Viewer configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.
//!
//! ```json
//! {
//!   "initial_zoom": 1.0,
//!   "auto_rotate": true,
//!   "transition": "crossfade",
//!   "safe_zone": { "width": 300.0, "height": 100.0 }
//! }
//! ```

use crate::controls::{AutoRotateDriver, SafeZone, DEFAULT_FRAME_INTERVAL};
use crate::effects::TransitionPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Zoom on mount (1.0 = card at rest)
    pub initial_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Multiplier per scroll step
    pub scroll_zoom_factor: f32,
    /// Start spinning on mount
    pub auto_rotate: bool,
    pub auto_rotate_driver: AutoRotateDriver,
    /// Auto-rotation tick spacing for the timer driver
    pub frame_interval_ms: u64,
    /// AR effect strength, `[0, 1]`
    pub effect_intensity: f32,
    pub transition: TransitionPolicy,
    pub safe_zone: SafeZone,
    /// Hover parallax enabled
    pub allow_rotation: bool,
    /// Base directory for relative image URLs
    pub image_root: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 1.0,
            min_zoom: 0.5,
            max_zoom: 3.0,
            scroll_zoom_factor: 1.1,
            auto_rotate: true,
            auto_rotate_driver: AutoRotateDriver::Timer,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            effect_intensity: 0.5,
            transition: TransitionPolicy::Crossfade,
            safe_zone: SafeZone::default(),
            allow_rotation: true,
            image_root: None,
        }
    }
}

impl ViewerConfig {
    /// `<config dir>/cardshow/viewer.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cardshow").join("viewer.json"))
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Loaded viewer config: {}", path.display());
        Ok(config.sanitized())
    }

    /// Load from [`default_path`](Self::default_path) if present, else defaults
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_else(|e| {
                tracing::warn!("{:#}; using defaults", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Timer tick spacing, at least 1 ms
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Clamp a zoom value to the configured range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Repair inverted zoom limits
    fn sanitized(mut self) -> Self {
        if self.min_zoom > self.max_zoom {
            tracing::warn!(
                "Invalid zoom limits [{}, {}], repairing",
                self.min_zoom,
                self.max_zoom
            );
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        self
    }

    /// Spinning card, full AR effects
    pub fn showcase() -> Self {
        Self {
            auto_rotate: true,
            effect_intensity: 1.0,
            ..Default::default()
        }
    }

    /// Still card with boolean face switching, for lists and thumbnails
    pub fn static_display() -> Self {
        Self {
            auto_rotate: false,
            allow_rotation: false,
            transition: TransitionPolicy::Solid,
            effect_intensity: 0.0,
            ..Default::default()
        }
    }

    /// Serve card images from the directory containing `path`
    pub fn for_card(path: &str) -> Self {
        Self {
            image_root: Path::new(path).parent().map(Path::to_path_buf),
            ..Default::default()
        }
    }
}
