//! # Audio Decoder Module
//!
//! MPEG-1/2 Layer III decoding on top of the Symphonia library.
//!
//! ## Architecture
//!
//! The decoder uses Symphonia's three-layer architecture:
//!
//! 1. **MediaSource**: the opened file, tracked until it is closed
//! 2. **FormatReader**: demultiplexes the MPEG audio stream into packets
//! 3. **Decoder**: decodes packets to PCM, converted here to S16LE bytes
//!
//! ```text
//! CodecRuntime → DecodeSession(TrackedFile → FormatReader → Decoder) → PcmSource
//! ```
//!
//! ## Resource Guarantees
//!
//! `CodecRuntime`, `DecodeSession` and the file handle each release
//! themselves on drop and are counted in a [`ResourceLedger`]. A session
//! borrows its runtime, so the runtime always outlives it.

mod format_detector;
mod frame_layout;
mod runtime;
mod sample_converter;
mod session;

pub use format_detector::FormatDetector;
pub use runtime::{CodecRuntime, ResourceLedger, ResourceSnapshot};
pub use sample_converter::{SampleConverter, I16_NORMALIZATION};
pub use session::{DecodeSession, SessionState};
