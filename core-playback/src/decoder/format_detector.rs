//! # Format Detection Module
//!
//! Probe hints and codec classification for MPEG audio streams.

use crate::error::{DecodeError, Result};
use crate::traits::AudioCodec;
use std::path::Path;
use symphonia::core::codecs::{CodecType, CODEC_TYPE_MP1, CODEC_TYPE_MP2, CODEC_TYPE_MP3};
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Format detector for audio streams.
///
/// Generates hints for Symphonia's probe system and maps the probed codec
/// onto [`AudioCodec`].
pub struct FormatDetector;

impl FormatDetector {
    /// Create a probe hint from file path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_playback::FormatDetector;
    /// use std::path::Path;
    ///
    /// let hint = FormatDetector::hint_from_path(Path::new("/music/song.mp3"));
    /// ```
    pub fn hint_from_path(path: &Path) -> Hint {
        let mut hint = Hint::new();

        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            debug!("Setting probe hint extension: {}", extension);
            hint.with_extension(extension);
        } else {
            debug!("No file extension found, probe will auto-detect");
        }

        hint.mime_type(Self::codec_mime_type(&AudioCodec::Mp3));
        hint
    }

    /// Detect audio codec from Symphonia codec type.
    pub fn detect_codec(codec_type: CodecType) -> AudioCodec {
        if codec_type == CODEC_TYPE_MP3 {
            AudioCodec::Mp3
        } else if codec_type == CODEC_TYPE_MP2 {
            AudioCodec::Mp2
        } else if codec_type == CODEC_TYPE_MP1 {
            AudioCodec::Mp1
        } else {
            warn!("Unknown codec type: {:?}", codec_type);
            AudioCodec::Other(format!("{:?}", codec_type))
        }
    }

    /// Validate that a codec can be decoded by this build.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Layer III with the `decoder-mp3` feature enabled
    /// - `Err(DecodeError::FormatNegotiation)` - anything else
    pub fn validate_codec_support(codec: &AudioCodec) -> Result<()> {
        match codec {
            AudioCodec::Mp3 => {
                #[cfg(not(feature = "decoder-mp3"))]
                return Err(DecodeError::FormatNegotiation(
                    "MP3 decoder not enabled. Enable 'decoder-mp3' feature".to_string(),
                ));
                #[cfg(feature = "decoder-mp3")]
                Ok(())
            }
            AudioCodec::Mp1 | AudioCodec::Mp2 => Err(DecodeError::FormatNegotiation(format!(
                "MPEG audio layer {:?} is not accepted, only Layer III",
                codec
            ))),
            AudioCodec::Other(name) => Err(DecodeError::FormatNegotiation(format!(
                "Unsupported codec: {}",
                name
            ))),
        }
    }

    /// Get the MIME type for a codec.
    pub fn codec_mime_type(codec: &AudioCodec) -> &'static str {
        match codec {
            AudioCodec::Mp1 | AudioCodec::Mp2 | AudioCodec::Mp3 => "audio/mpeg",
            AudioCodec::Other(_) => "application/octet-stream",
        }
    }
}
