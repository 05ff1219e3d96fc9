//! # Core Decoding Traits
//!
//! Format descriptors and the `PcmSource` seam between a codec session and
//! the chunked read loop.
//!
//! ## Architecture
//!
//! ```text
//! DecodeSession (codec) --read_chunk(8192 B)--> read loop --> AudioBuffer
//! ```
//!
//! The session fills byte chunks with interleaved 16-bit little-endian PCM;
//! the loop reinterprets each chunk as samples and normalizes them. Any type
//! that can fill a byte buffer this way can feed the loop, which is how the
//! reassembly logic is tested without a real codec.

use crate::error::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// Audio Format Types
// ============================================================================

/// Codecs the MPEG audio reader can report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// MPEG-1/2 Audio Layer I
    Mp1,
    /// MPEG-1/2 Audio Layer II
    Mp2,
    /// MPEG-1/2 Audio Layer III
    Mp3,
    /// Anything else the probe found
    Other(String),
}

/// Sample encoding of the PCM handed to the read loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleEncoding {
    /// Signed 16-bit little-endian
    SignedInt16,
}

impl SampleEncoding {
    /// Bytes occupied by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleEncoding::SignedInt16 => 2,
        }
    }
}

/// Format negotiated for a decode session.
///
/// Rate and channel count are the stream's native values; the encoding is
/// always forced to [`SampleEncoding::SignedInt16`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Source codec (before decoding)
    pub codec: AudioCodec,
    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Output sample encoding
    pub encoding: SampleEncoding,
}

impl StreamFormat {
    /// Create a format with the forced 16-bit output encoding.
    pub fn new(codec: AudioCodec, sample_rate: u32, channels: u16) -> Self {
        Self {
            codec,
            sample_rate,
            channels,
            encoding: SampleEncoding::SignedInt16,
        }
    }

    /// Bytes occupied by one interleaved frame (all channels).
    pub fn bytes_per_frame(&self) -> usize {
        self.encoding.bytes_per_sample() * self.channels as usize
    }
}

// ============================================================================
// Core Traits
// ============================================================================

/// Outcome of a single chunk read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// `n` bytes of interleaved PCM were written to the front of the buffer
    Data(usize),
    /// The stream is exhausted; nothing was written
    EndOfStream,
}

/// A producer of interleaved signed 16-bit little-endian PCM bytes.
///
/// Implementations may return fewer bytes than the buffer holds, including an
/// odd count that splits a sample across two reads; the consumer reassembles
/// it. Once `EndOfStream` is returned, later calls must keep returning it.
#[cfg_attr(test, mockall::automock)]
pub trait PcmSource {
    /// Fill `buf` from the front with as many PCM bytes as are available.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure that cannot be skipped.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ChunkStatus>;
}
