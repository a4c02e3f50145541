//! Project snapshot consumed by the rendering worker
//!
//! The surrounding application owns the real project (edits, takes, undo
//! history); the core only reads an immutable snapshot of the pieces it
//! needs. A data change means building a new snapshot and rebinding it on
//! the bridge, never mutating one in place.

use crate::audio::AudioBuffer;

/// Per-frame pitch contour with voiced/unvoiced mask
///
/// One frame per fixed analysis hop. A non-positive `pitch_hz` value means
/// unvoiced/unknown; the `voiced` flag is independent of the stored value
/// (a frame can be marked unvoiced while still carrying a stale positive
/// pitch).
#[derive(Debug, Clone, Default)]
pub struct F0Contour {
    pitch_hz: Vec<f32>,
    voiced: Vec<bool>,
}

impl F0Contour {
    /// Create a contour from parallel pitch and voiced sequences
    ///
    /// Both sequences must have the same length, one entry per frame.
    pub fn new(pitch_hz: Vec<f32>, voiced: Vec<bool>) -> Self {
        debug_assert_eq!(pitch_hz.len(), voiced.len());
        Self { pitch_hz, voiced }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.pitch_hz.len()
    }

    /// Check whether the contour has no frames
    pub fn is_empty(&self) -> bool {
        self.pitch_hz.is_empty()
    }

    /// Per-frame pitch values in Hz
    pub fn pitch_hz(&self) -> &[f32] {
        &self.pitch_hz
    }

    /// Per-frame voiced/unvoiced flags
    pub fn voiced(&self) -> &[bool] {
        &self.voiced
    }
}

/// Immutable snapshot of the project state a render reads from
#[derive(Debug, Clone)]
pub struct Project {
    /// Raw F0 contour produced by analysis
    pub contour: F0Contour,

    /// Original source audio
    pub source: AudioBuffer,

    /// Sample rate of the source audio in Hz
    pub sample_rate: f64,

    /// Analysis hop size in samples (frame spacing of the contour)
    pub hop_size: usize,
}

impl Project {
    /// Create a project snapshot
    pub fn new(contour: F0Contour, source: AudioBuffer, sample_rate: f64, hop_size: usize) -> Self {
        Self {
            contour,
            source,
            sample_rate,
            hop_size,
        }
    }
}
