//! # Decoding Module
//!
//! Turns a validated MP3 file into a normalized PCM buffer for downstream
//! spectral analysis.
//!
//! ## Overview
//!
//! This module handles:
//! - A scoped handle around the process-wide codec registry (`CodecRuntime`)
//! - Per-file decode sessions with guaranteed release on every exit path
//! - Forced 16-bit signed output at the stream's native rate and channel count
//! - Chunked reassembly of interleaved samples into `[-1.0, 1.0]` floats
//!
//! Decoding is synchronous and runs entirely on the caller's thread.

pub mod buffer;
pub mod decoder;
pub mod error;
pub mod streaming;
pub mod traits;

pub use buffer::AudioBuffer;
pub use decoder::{
    CodecRuntime, DecodeSession, FormatDetector, ResourceLedger, ResourceSnapshot,
    SampleConverter, SessionState,
};
pub use error::{DecodeError, Result};
pub use streaming::{read_all, StreamingDecoder};
pub use traits::{AudioCodec, ChunkStatus, PcmSource, SampleEncoding, StreamFormat};
