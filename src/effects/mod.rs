//! Derived card visuals
//!
//! Pure functions of the rotation (and zoom): which face shows and how
//! strongly, and the AR depth cues layered on top.

mod ar;
mod uniforms;
mod visibility;

pub use ar::*;
pub use uniforms::*;
pub use visibility::*;
