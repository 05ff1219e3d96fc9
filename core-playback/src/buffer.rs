//! # Audio Buffer
//!
//! The decoded, normalized PCM result of one decode call.

use crate::error::{DecodeError, Result};
use std::time::Duration;

/// Interleaved PCM samples in `[-1.0, 1.0]` plus their native format.
///
/// Sample order is exactly what the codec delivered: for stereo,
/// `L0 R0 L1 R1 ...`. The buffer is immutable once built and owned by the
/// caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Build a buffer, checking that the samples form whole frames.
    ///
    /// # Errors
    ///
    /// - `DecodeError::InvalidBuffer` if `sample_rate` or `channels` is zero
    /// - `DecodeError::MisalignedSamples` if `samples.len()` is not a
    ///   multiple of `channels`
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DecodeError::InvalidBuffer(
                "sample rate must be greater than 0".to_string(),
            ));
        }

        if channels == 0 {
            return Err(DecodeError::InvalidBuffer(
                "channel count must be greater than 0".to_string(),
            ));
        }

        if samples.len() % channels as usize != 0 {
            return Err(DecodeError::MisalignedSamples {
                samples: samples.len(),
                channels,
            });
        }

        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    /// Native sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Playback length implied by the frame count and sample rate.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consume the buffer, returning the interleaved samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
