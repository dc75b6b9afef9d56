//! Card rotation state
//!
//! The viewer root owns one [`Rotation`] and hands clones of it to whatever
//! writes (auto-rotation ticker, pointer controller) or reads (visibility,
//! AR effects) the card orientation. Values are replaced whole through a
//! `watch` channel, so a reader never observes one axis updated without
//! the other.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Two-axis card orientation in degrees
///
/// Unbounded: values are never clamped or wrapped here. Consumers that care
/// about the visible face normalize with
/// [`normalize_degrees`](crate::effects::normalize_degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    /// Tilt around the horizontal axis
    pub x: f32,
    /// Spin around the vertical axis
    pub y: f32,
}

impl RotationState {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Shared owner of the canonical [`RotationState`]
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct Rotation {
    tx: Arc<watch::Sender<RotationState>>,
}

impl Rotation {
    pub fn new(initial: RotationState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current orientation
    pub fn get(&self) -> RotationState {
        *self.tx.borrow()
    }

    /// Replace both axes at once
    pub fn set(&self, rotation: RotationState) {
        self.tx.send_replace(rotation);
    }

    /// Read-modify-write under the channel lock.
    ///
    /// `f` returns `None` to leave the state untouched (and not notify).
    /// Returns whether the state was replaced.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(RotationState) -> Option<RotationState>,
    {
        self.tx.send_if_modified(|current| match f(*current) {
            Some(next) => {
                *current = next;
                true
            }
            None => false,
        })
    }

    /// Receiver notified on every replacement
    pub fn subscribe(&self) -> watch::Receiver<RotationState> {
        self.tx.subscribe()
    }

    /// Back to `{0, 0}`
    pub fn reset(&self) {
        self.set(RotationState::ZERO);
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new(RotationState::ZERO)
    }
}
