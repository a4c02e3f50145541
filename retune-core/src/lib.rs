//! Retune - Pitch-Correction DSP Core
//!
//! F0 contour cleaning and a background/real-time bridge that serves
//! pitch-corrected audio to a fixed-budget playback callback.

pub mod audio;
pub mod contour;
pub mod project;
pub mod render;

pub use audio::{AudioBuffer, HostPosition, RealtimePitchBridge};
pub use contour::{smooth_f0, SinusoidalKernel};
pub use project::{F0Contour, Project};
pub use render::{CancelToken, PitchRenderer, RenderError};
