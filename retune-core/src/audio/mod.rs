//! Audio buffers, the real-time bridge, and device playback

pub mod bridge;
pub mod buffer;
pub mod playback;

pub use bridge::{HostPosition, RealtimePitchBridge};
pub use buffer::AudioBuffer;
pub use playback::PlaybackEngine;
