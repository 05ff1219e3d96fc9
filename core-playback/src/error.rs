//! # Decode Error Types
//!
//! Error types for codec runtime, session and stream failures.

use thiserror::Error;

/// Errors that can occur while decoding a file.
#[derive(Error, Debug)]
pub enum DecodeError {
    // ========================================================================
    // Session Setup Errors
    // ========================================================================
    /// The codec runtime could not be brought up.
    #[error("Codec runtime failed to initialize: {0}")]
    RuntimeInit(String),

    /// The file could not be opened or probed by the codec.
    #[error("Failed to open audio source: {0}")]
    Open(String),

    /// Rate, channel count or codec could not be determined.
    #[error("Could not determine stream format: {0}")]
    FormatNegotiation(String),

    // ========================================================================
    // Streaming Errors
    // ========================================================================
    /// A read from the codec failed in a way that cannot be skipped.
    #[error("Stream read failed: {0}")]
    StreamRead(String),

    /// Too many consecutive packets failed to decode.
    #[error("Corrupted audio stream: {0}")]
    CorruptedStream(String),

    /// The stream ended before producing a single sample.
    #[error("Stream produced no audio samples")]
    EmptyStream,

    // ========================================================================
    // Buffer Errors
    // ========================================================================
    /// Sample count does not divide evenly into frames.
    #[error("{samples} samples do not divide into {channels}-channel frames")]
    MisalignedSamples { samples: usize, channels: u16 },

    /// Buffer parameters are out of range.
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Returns `true` if the failure happened before any audio was streamed.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            DecodeError::Open(_) | DecodeError::FormatNegotiation(_)
        )
    }

    /// Returns `true` if the failure happened while pulling audio.
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            DecodeError::StreamRead(_)
                | DecodeError::CorruptedStream(_)
                | DecodeError::EmptyStream
        )
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
