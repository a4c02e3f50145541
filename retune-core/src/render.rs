//! Synthesis contract between the bridge worker and an external vocoder
//!
//! The core never implements synthesis itself; it hands a cleaned contour
//! to a [`PitchRenderer`] and expects a full corrected-audio buffer back.
//! Renders may take arbitrary time and are asked to stop early through a
//! cooperative [`CancelToken`].

use crate::audio::AudioBuffer;
use crate::project::Project;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The render observed its cancel token; normal control flow, not a failure
    #[error("render cancelled")]
    Cancelled,

    #[error("project has no source audio")]
    NoAudio,

    #[error("synthesis failed: {0}")]
    Synthesis(String),
}

/// Cooperative cancellation token
///
/// Cheap to clone; raised by the bridge, polled by renderers at coarse
/// checkpoints (e.g. between synthesis chunks). There is no preemption:
/// a render that never polls is simply allowed to finish and its result
/// discarded.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether the token has been raised
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Lower the token before a fresh render
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Renders a full corrected-audio buffer from a cleaned F0 contour
///
/// Implementations must poll `cancel` between synthesis chunks and bail
/// out with [`RenderError::Cancelled`] promptly once it trips. The returned
/// buffer must be fully populated; the bridge publishes it as-is.
pub trait PitchRenderer: Send + Sync {
    fn render(
        &self,
        project: &Project,
        smoothed_f0: &[f32],
        cancel: &CancelToken,
    ) -> Result<AudioBuffer, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_roundtrip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());

        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
