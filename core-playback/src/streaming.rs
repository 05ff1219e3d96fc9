//! # Streaming Decoder
//!
//! Decodes a whole MP3 file into an [`AudioBuffer`] by pulling fixed-size
//! PCM chunks from a codec session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  CodecRuntime (scoped registry handle)   │
//! │   └─ DecodeSession (file + codec)        │
//! └────────────┬─────────────────────────────┘
//!              │ read_chunk(8192 B), S16LE interleaved
//!              ▼
//! ┌──────────────────────────────────────────┐
//! │  read_all: carry odd byte, / 32768.0     │
//! └────────────┬─────────────────────────────┘
//!              │ Vec<f32> in [-1.0, 1.0]
//!              ▼
//! ┌──────────────────────────────────────────┐
//! │  AudioBuffer { rate, channels, samples } │
//! └──────────────────────────────────────────┘
//! ```
//!
//! The runtime and session are owned by `decode` and dropped before it
//! returns, on success and on every error path.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core_playback::StreamingDecoder;
//! use std::path::Path;
//!
//! # fn example() -> core_playback::Result<()> {
//! let decoder = StreamingDecoder::new();
//! let buffer = decoder.decode(Path::new("/music/song.mp3"))?;
//! println!("{} Hz, {} ch, {:?}", buffer.sample_rate(), buffer.channels(), buffer.duration());
//! # Ok(())
//! # }
//! ```

use crate::buffer::AudioBuffer;
use crate::decoder::{CodecRuntime, ResourceLedger, ResourceSnapshot, SampleConverter};
use crate::error::{DecodeError, Result};
use crate::traits::{ChunkStatus, PcmSource};
use core_runtime::config::IngestConfig;
use core_runtime::logging::strip_path;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Synchronous whole-file MP3 decoder.
#[derive(Debug)]
pub struct StreamingDecoder {
    config: IngestConfig,
    ledger: Arc<ResourceLedger>,
}

impl Default for StreamingDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingDecoder {
    /// Create a decoder with the default chunk size and error budget.
    pub fn new() -> Self {
        Self::with_config(IngestConfig::default())
    }

    pub fn with_config(config: IngestConfig) -> Self {
        Self {
            config,
            ledger: Arc::new(ResourceLedger::new()),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Runtime handles, sessions and files currently held by this decoder.
    ///
    /// Always idle between calls to [`decode`](Self::decode).
    pub fn resources(&self) -> ResourceSnapshot {
        self.ledger.snapshot()
    }

    /// Decode the file at `path` into a normalized PCM buffer.
    ///
    /// # Errors
    ///
    /// - `DecodeError::RuntimeInit` - no MP3 codec available
    /// - `DecodeError::Open` - file missing or not an MPEG audio stream
    /// - `DecodeError::FormatNegotiation` - rate, channels or codec unknown
    /// - `DecodeError::StreamRead` / `CorruptedStream` - fatal read failure
    /// - `DecodeError::EmptyStream` - no samples were produced
    #[instrument(skip(self, path), fields(file = %strip_path(&path.to_string_lossy())))]
    pub fn decode(&self, path: &Path) -> Result<AudioBuffer> {
        let started = Instant::now();

        let runtime = CodecRuntime::init(Arc::clone(&self.ledger))?;
        let mut session =
            runtime.open_session(path, self.config.max_consecutive_decode_errors)?;
        let format = session.negotiate()?;

        let samples = read_all(&mut session, self.config.chunk_size_bytes)?;
        drop(session);
        drop(runtime);

        let clipped = SampleConverter::validate_samples(&samples);
        let buffer = AudioBuffer::new(format.sample_rate, format.channels, samples)?;

        info!(
            sample_rate = buffer.sample_rate(),
            channels = buffer.channels(),
            samples = buffer.samples().len(),
            duration_secs = buffer.duration().as_secs_f64(),
            clipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Decoded audio"
        );

        Ok(buffer)
    }
}

/// Drain `source` in chunks of `chunk_size` bytes into normalized samples.
///
/// Each chunk is read as interleaved signed 16-bit little-endian samples and
/// divided by 32768. A byte left over at the end of one chunk is joined with
/// the first byte of the next, so samples split across chunk boundaries are
/// reassembled. A zero-length `Data` read is treated as end of stream.
///
/// # Errors
///
/// - Any error returned by `source`
/// - `DecodeError::StreamRead` if the stream ends halfway through a sample
/// - `DecodeError::EmptyStream` if no samples were produced
pub fn read_all<S: PcmSource + ?Sized>(source: &mut S, chunk_size: usize) -> Result<Vec<f32>> {
    let mut chunk = vec![0u8; chunk_size.max(2)];
    let mut samples = Vec::new();
    let mut carry: Option<u8> = None;
    let mut chunks = 0usize;

    loop {
        let n = match source.read_chunk(&mut chunk)? {
            ChunkStatus::Data(0) | ChunkStatus::EndOfStream => break,
            ChunkStatus::Data(n) => n.min(chunk.len()),
        };
        chunks += 1;

        let mut bytes = &chunk[..n];

        if let Some(low) = carry.take() {
            samples.push(SampleConverter::normalize(i16::from_le_bytes([low, bytes[0]])));
            bytes = &bytes[1..];
        }

        SampleConverter::extend_normalized(bytes, &mut samples);

        if bytes.len() % 2 == 1 {
            carry = bytes.last().copied();
        }
    }

    debug!(chunks, samples = samples.len(), "Read loop finished");

    if carry.is_some() {
        warn!("Stream ended with half a sample pending");
        return Err(DecodeError::StreamRead(
            "stream ended in the middle of a 16-bit sample".to_string(),
        ));
    }

    if samples.is_empty() {
        return Err(DecodeError::EmptyStream);
    }

    Ok(samples)
}
