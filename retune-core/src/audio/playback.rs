//! Audio device playback using cpal
//!
//! Standalone counterpart of a plugin host callback: each device callback
//! asks the bridge for one block of corrected audio (or passthrough from
//! the project source) and advances the playback cursor. The bridge itself
//! never advances the cursor; this engine owns that.

use crate::audio::bridge::RealtimePitchBridge;
use crate::audio::buffer::AudioBuffer;
use crate::project::Project;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),
}

/// Audio output device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Device playback driving a [`RealtimePitchBridge`]
pub struct PlaybackEngine {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl PlaybackEngine {
    /// Open the default output device
    ///
    /// # Arguments
    /// * `bridge` - Bridge serving corrected audio; `prepare_to_play` is
    ///   called with the device geometry before the stream is built
    /// * `project` - Project whose source audio feeds passthrough
    pub fn from_default_device(
        bridge: Arc<RealtimePitchBridge>,
        project: Arc<Project>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, bridge, project)
    }

    /// Open a specific output device
    pub fn from_device(
        device: Device,
        bridge: Arc<RealtimePitchBridge>,
        project: Arc<Project>,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config: StreamConfig = config.into();
        let num_channels = channels as usize;

        bridge.prepare_to_play(sample_rate as f64, 0);

        // Block buffers live outside the callback; they only reallocate
        // when the device changes its callback size
        let mut input_block = AudioBuffer::new(num_channels, 0);
        let mut output_block = AudioBuffer::new(num_channels, 0);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / num_channels.max(1);

                    if input_block.frames() != frames {
                        input_block = AudioBuffer::new(num_channels, frames);
                        output_block = AudioBuffer::new(num_channels, frames);
                    }

                    let cursor = bridge.position();
                    fill_passthrough(&project, cursor, &mut input_block);

                    bridge.process_block(&input_block, &mut output_block, None);

                    // Interleave planar block into the device buffer
                    for frame in 0..frames {
                        for ch in 0..num_channels {
                            data[frame * num_channels + ch] = output_block.channel(ch)[frame];
                        }
                    }

                    bridge.set_position(cursor + frames as f64 / sample_rate as f64);
                },
                move |err| {
                    log::error!("audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start audio playback
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio playback
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// Slice the project source at the cursor into `block` (passthrough input)
fn fill_passthrough(project: &Project, cursor_seconds: f64, block: &mut AudioBuffer) {
    let source = &project.source;
    if source.channels() == 0 {
        block.clear();
        return;
    }

    let start = (cursor_seconds.max(0.0) * project.sample_rate).round() as usize;

    for ch in 0..block.channels() {
        let src = source.channel(ch.min(source.channels() - 1));
        let dest = block.channel_mut(ch);

        for (i, sample) in dest.iter_mut().enumerate() {
            let idx = start + i;
            *sample = if idx < src.len() { src[idx] } else { 0.0 };
        }
    }
}

/// List available audio output devices
pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .output_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_output_config() {
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::F0Contour;

    #[test]
    fn test_fill_passthrough_slices_source() {
        let source = AudioBuffer::from_mono((0..100).map(|i| i as f32).collect());
        let project = Project::new(F0Contour::default(), source, 100.0, 256);

        let mut block = AudioBuffer::new(1, 8);
        fill_passthrough(&project, 0.5, &mut block);

        assert_eq!(block.channel(0)[0], 50.0);
        assert_eq!(block.channel(0)[7], 57.0);
    }

    #[test]
    fn test_fill_passthrough_past_end_is_silent() {
        let source = AudioBuffer::from_mono(vec![1.0; 10]);
        let project = Project::new(F0Contour::default(), source, 100.0, 256);

        let mut block = AudioBuffer::new(1, 8);
        fill_passthrough(&project, 1.0, &mut block);

        assert!(block.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_fill_passthrough_recycles_mono_source() {
        let source = AudioBuffer::from_mono(vec![0.5; 16]);
        let project = Project::new(F0Contour::default(), source, 100.0, 256);

        let mut block = AudioBuffer::new(2, 4);
        fill_passthrough(&project, 0.0, &mut block);

        assert_eq!(block.channel(0), block.channel(1));
        assert_eq!(block.channel(0)[0], 0.5);
    }
}
