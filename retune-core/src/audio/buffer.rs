//! Multi-channel audio sample buffer
//!
//! Planar f32 storage, one contiguous slice per channel. Corrected-audio
//! buffers are filled completely before they are published; the bridge
//! swaps whole buffer handles and never mutates a published buffer.

/// Multi-channel planar audio buffer
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl AudioBuffer {
    /// Create a zero-filled buffer
    ///
    /// # Arguments
    /// * `num_channels` - Number of channels
    /// * `frames` - Number of frames (samples per channel)
    pub fn new(num_channels: usize, frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; num_channels],
            frames,
        }
    }

    /// Wrap a mono sample vector as a single-channel buffer
    pub fn from_mono(samples: Vec<f32>) -> Self {
        let frames = samples.len();
        Self {
            channels: vec![samples],
            frames,
        }
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames per channel
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Get one channel's samples
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Get one channel's samples mutably
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Zero all samples
    pub fn clear(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.fill(0.0);
        }
    }

    /// Copy another buffer into this one
    ///
    /// Copies the overlapping channel/frame region; everything outside the
    /// overlap is zeroed, so the result never carries stale samples.
    pub fn copy_from(&mut self, other: &AudioBuffer) {
        let shared_channels = self.channels().min(other.channels());
        let shared_frames = self.frames.min(other.frames);

        for ch in 0..self.channels() {
            let dest = &mut self.channels[ch];
            if ch < shared_channels {
                dest[..shared_frames].copy_from_slice(&other.channels[ch][..shared_frames]);
                dest[shared_frames..].fill(0.0);
            } else {
                dest.fill(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_silent() {
        let buffer = AudioBuffer::new(2, 64);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 64);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
        assert!(buffer.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_from_mono() {
        let buffer = AudioBuffer::from_mono(vec![0.5, -0.5, 0.25]);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.channel(0)[1], -0.5);
    }

    #[test]
    fn test_copy_from_same_shape() {
        let mut src = AudioBuffer::new(1, 4);
        src.channel_mut(0).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);

        let mut dest = AudioBuffer::new(1, 4);
        dest.copy_from(&src);
        assert_eq!(dest.channel(0), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_copy_from_zeroes_outside_overlap() {
        let mut src = AudioBuffer::new(1, 2);
        src.channel_mut(0).copy_from_slice(&[1.0, 2.0]);

        let mut dest = AudioBuffer::new(2, 4);
        dest.channel_mut(0).fill(9.0);
        dest.channel_mut(1).fill(9.0);
        dest.copy_from(&src);

        assert_eq!(dest.channel(0), &[1.0, 2.0, 0.0, 0.0]);
        assert!(dest.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_clear() {
        let mut buffer = AudioBuffer::from_mono(vec![1.0; 8]);
        buffer.clear();
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
    }
}
