//! # Decode Session
//!
//! Per-file codec state: the demuxer, the packet decoder, the negotiated
//! format and any decoded PCM not yet handed out.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized -> Opened -> FormatNegotiated -> Streaming -> Closed
//! ```
//!
//! `Closed` is reached by [`DecodeSession::close`] or by dropping the session,
//! whichever comes first. Either way the demuxer, the decoder and the
//! underlying file handle are released, including when a step fails.
//!
//! A file that ends inside a frame fails with `StreamRead` once the demuxer
//! runs dry, instead of quietly dropping the partial frame.

use crate::decoder::format_detector::FormatDetector;
use crate::decoder::frame_layout;
use crate::decoder::runtime::{CodecRuntime, TrackedFile};
use crate::decoder::sample_converter::SampleConverter;
use crate::error::{DecodeError, Result};
use crate::traits::{ChunkStatus, PcmSource, StreamFormat};
use bytes::{Buf, BytesMut};
use core_runtime::logging::strip_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use tracing::{debug, error, trace, warn};

/// Where a [`DecodeSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// File opened and container probed
    Opened,
    /// Rate, channels and codec known; decoder built
    FormatNegotiated,
    /// At least one chunk has been requested
    Streaming,
    /// Codec and file released
    Closed,
}

/// One open file inside a [`CodecRuntime`].
pub struct DecodeSession<'rt> {
    runtime: &'rt CodecRuntime,
    state: SessionState,
    source_name: String,
    path: PathBuf,
    reader: Option<Box<dyn FormatReader>>,
    decoder: Option<Box<dyn Decoder>>,
    track_id: u32,
    format: Option<StreamFormat>,
    /// Decoded S16LE bytes not yet returned by `read_chunk`
    pending: BytesMut,
    scratch: Option<SampleBuffer<i16>>,
    max_consecutive_errors: usize,
    frames_decoded: u64,
    eof: bool,
}

impl<'rt> DecodeSession<'rt> {
    /// Open `path` and probe its container.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::Open` if the file cannot be opened or the probe
    /// finds no MPEG audio stream in it.
    pub(crate) fn open(
        runtime: &'rt CodecRuntime,
        path: &Path,
        max_consecutive_errors: usize,
    ) -> Result<Self> {
        let source_name = strip_path(&path.to_string_lossy()).to_string();

        let mut session = Self {
            runtime,
            state: SessionState::Uninitialized,
            source_name,
            path: path.to_path_buf(),
            reader: None,
            decoder: None,
            track_id: 0,
            format: None,
            pending: BytesMut::new(),
            scratch: None,
            max_consecutive_errors: max_consecutive_errors.max(1),
            frames_decoded: 0,
            eof: false,
        };
        runtime.ledger().acquire_session();

        let file = TrackedFile::open(path, Arc::clone(runtime.ledger())).map_err(|e| {
            error!(file = %session.source_name, "Failed to open file: {}", e);
            DecodeError::Open(format!("{}: {}", session.source_name, e))
        })?;

        let hint = FormatDetector::hint_from_path(path);
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!(file = %session.source_name, "Format probe failed: {}", e);
                DecodeError::Open(format!("Failed to probe {}: {}", session.source_name, e))
            })?;

        session.reader = Some(probed.format);
        session.state = SessionState::Opened;
        debug!(file = %session.source_name, "Decode session opened");

        Ok(session)
    }

    /// Determine the stream's native rate and channel count and build the
    /// packet decoder. Output is always signed 16-bit.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::FormatNegotiation` if the session is not freshly
    /// opened, no audio track exists, the codec is not MPEG Layer III, or the
    /// rate or channel count is unknown.
    pub fn negotiate(&mut self) -> Result<StreamFormat> {
        if self.state != SessionState::Opened {
            return Err(DecodeError::FormatNegotiation(format!(
                "cannot negotiate from state {:?}",
                self.state
            )));
        }

        let reader = self.reader.as_ref().ok_or_else(|| {
            DecodeError::FormatNegotiation("no container reader".to_string())
        })?;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                DecodeError::FormatNegotiation("No decodable audio track".to_string())
            })?;

        let codec = FormatDetector::detect_codec(track.codec_params.codec);
        FormatDetector::validate_codec_support(&codec)?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|&rate| rate > 0)
            .ok_or_else(|| DecodeError::FormatNegotiation("Missing sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|ch| ch.count() as u16)
            .filter(|&count| count > 0)
            .ok_or_else(|| DecodeError::FormatNegotiation("Missing channel layout".to_string()))?;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                error!("Failed to create decoder: {}", e);
                DecodeError::FormatNegotiation(format!("Failed to create codec decoder: {}", e))
            })?;

        let format = StreamFormat::new(codec, sample_rate, channels);
        debug!(
            file = %self.source_name,
            sample_rate,
            channels,
            "Negotiated stream format"
        );

        self.track_id = track.id;
        self.decoder = Some(decoder);
        self.format = Some(format.clone());
        self.state = SessionState::FormatNegotiated;

        Ok(format)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Negotiated format, once [`negotiate`](Self::negotiate) has succeeded.
    pub fn format(&self) -> Option<&StreamFormat> {
        self.format.as_ref()
    }

    /// Frames decoded so far.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Release the codec and the file handle. Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        self.decoder = None;
        self.reader = None;
        self.scratch = None;
        self.pending.clear();

        trace!(
            file = %self.source_name,
            from = ?self.state,
            frames = self.frames_decoded,
            "Decode session closed"
        );
        self.state = SessionState::Closed;
    }

    /// Decode packets until one yields audio or the stream ends.
    ///
    /// Corrupt packets are skipped; `max_consecutive_errors` failures in a
    /// row abort the stream. At end of stream the frame chain is checked for a
    /// cut-off final frame.
    fn decode_next_packet(&mut self) -> Result<()> {
        let (Some(reader), Some(decoder), Some(format)) = (
            self.reader.as_mut(),
            self.decoder.as_mut(),
            self.format.as_ref(),
        ) else {
            return Err(DecodeError::StreamRead("session is not streaming".to_string()));
        };

        let max_errors = self.max_consecutive_errors;
        let mut consecutive_errors = 0;

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("Reached end of stream at {} frames", self.frames_decoded);
                    self.eof = true;
                    return frame_layout::verify_complete(&self.path, &self.source_name);
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("Decoder reset required for track list change");
                    return Err(DecodeError::StreamRead(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "I/O error reading packet (attempt {}/{}): {}",
                        consecutive_errors, max_errors, e
                    );

                    if consecutive_errors >= max_errors {
                        error!("Too many consecutive I/O errors, giving up");
                        return Err(DecodeError::CorruptedStream(format!(
                            "Stream I/O failure after {} attempts: {}",
                            max_errors, e
                        )));
                    }

                    continue;
                }
                Err(e) => {
                    error!("Fatal format reader error: {}", e);
                    return Err(DecodeError::StreamRead(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count() as u16;

                    if channels != format.channels || spec.rate != format.sample_rate {
                        error!(
                            expected_channels = format.channels,
                            channels,
                            expected_rate = format.sample_rate,
                            rate = spec.rate,
                            "Stream format changed mid-stream"
                        );
                        return Err(DecodeError::StreamRead(format!(
                            "format changed mid-stream: {} Hz/{} ch -> {} Hz/{} ch",
                            format.sample_rate, format.channels, spec.rate, channels
                        )));
                    }

                    let frames = decoded.frames() as u64;
                    if frames == 0 {
                        continue;
                    }

                    SampleConverter::append_s16le(decoded, &mut self.scratch, &mut self.pending);
                    self.frames_decoded += frames;

                    trace!(
                        "Decoded packet: {} frames at position {}",
                        frames,
                        self.frames_decoded
                    );

                    return Ok(());
                }
                Err(SymphoniaError::IoError(err)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupted packet (I/O error, attempt {}/{}): {}",
                        consecutive_errors, max_errors, err
                    );

                    if consecutive_errors >= max_errors {
                        error!("Too many consecutive decode errors, stream may be corrupted");
                        return Err(DecodeError::CorruptedStream(format!(
                            "Stream corruption after {} failed packets",
                            max_errors
                        )));
                    }

                    continue;
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping packet with decode error (attempt {}/{}): {}",
                        consecutive_errors, max_errors, err
                    );

                    if consecutive_errors >= max_errors {
                        error!("Too many consecutive decode errors, stream may be corrupted");
                        return Err(DecodeError::CorruptedStream(format!(
                            "Decoder failure after {} failed packets: {}",
                            max_errors, err
                        )));
                    }

                    continue;
                }
                Err(e) => {
                    error!("Fatal decode error: {}", e);
                    return Err(DecodeError::StreamRead(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }
    }
}

impl PcmSource for DecodeSession<'_> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ChunkStatus> {
        match self.state {
            SessionState::FormatNegotiated => self.state = SessionState::Streaming,
            SessionState::Streaming => {}
            SessionState::Closed => return Ok(ChunkStatus::EndOfStream),
            other => {
                return Err(DecodeError::StreamRead(format!(
                    "cannot read from state {:?}",
                    other
                )))
            }
        }

        if buf.is_empty() {
            return Ok(ChunkStatus::Data(0));
        }

        while self.pending.len() < buf.len() && !self.eof {
            self.decode_next_packet()?;
        }

        if self.pending.is_empty() {
            return Ok(ChunkStatus::EndOfStream);
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);

        Ok(ChunkStatus::Data(n))
    }
}

impl Drop for DecodeSession<'_> {
    fn drop(&mut self) {
        self.close();
        self.runtime.ledger().release_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::runtime::ResourceLedger;
    use std::io::Write;

    fn runtime() -> (Arc<ResourceLedger>, CodecRuntime) {
        let ledger = Arc::new(ResourceLedger::new());
        let runtime = CodecRuntime::init(Arc::clone(&ledger)).unwrap();
        (ledger, runtime)
    }

    #[test]
    fn test_open_missing_file_releases_session() {
        let (ledger, runtime) = runtime();

        let result = runtime.open_session(Path::new("/no/such/file.mp3"), 10);
        assert!(matches!(result, Err(DecodeError::Open(_))));

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.sessions, 0);
        assert_eq!(snapshot.open_files, 0);
    }

    #[test]
    fn test_open_garbage_releases_file() {
        let (ledger, runtime) = runtime();
        let mut tmp = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        tmp.write_all(&[0x42u8; 2048]).unwrap();

        let result = runtime.open_session(tmp.path(), 10);
        assert!(matches!(result, Err(DecodeError::Open(_))));

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.sessions, 0);
        assert_eq!(snapshot.open_files, 0);
    }
}
