//! # Ingest Façade
//!
//! Validates a candidate file and, when it is accepted, decodes it.

use crate::error::Result;
use crate::validator::{ContainerValidator, ValidationReport};
use core_playback::{AudioBuffer, ResourceSnapshot, StreamingDecoder};
use core_runtime::config::IngestConfig;
use core_runtime::logging::strip_path;
use std::path::Path;
use tracing::{info, instrument};

/// A validated and decoded file, ready for analysis.
#[derive(Debug, Clone)]
pub struct IngestedTrack {
    pub report: ValidationReport,
    pub audio: AudioBuffer,
}

/// Validator and decoder sharing one configuration.
#[derive(Debug)]
pub struct IngestService {
    validator: ContainerValidator,
    decoder: StreamingDecoder,
}

impl Default for IngestService {
    fn default() -> Self {
        Self::with_config(IngestConfig::default())
    }
}

impl IngestService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IngestConfig) -> Self {
        Self {
            validator: ContainerValidator::with_config(config.clone()),
            decoder: StreamingDecoder::with_config(config),
        }
    }

    /// Build a service from a JSON config document.
    pub fn from_json_config(json: &str) -> Result<Self> {
        Ok(Self::with_config(IngestConfig::from_json_str(json)?))
    }

    pub fn validator(&self) -> &ContainerValidator {
        &self.validator
    }

    /// Decoder resources currently held; idle between calls.
    pub fn resources(&self) -> ResourceSnapshot {
        self.decoder.resources()
    }

    /// Validate `path`, then decode it.
    ///
    /// # Errors
    ///
    /// - `CoreError::Rejected` - validation refused the file; nothing decoded
    /// - `CoreError::Decode` - the file was accepted but decoding failed
    #[instrument(skip(self, path), fields(file = %strip_path(&path.to_string_lossy())))]
    pub fn ingest(&self, path: &Path) -> Result<IngestedTrack> {
        let report = self.validator.check(path)?;
        let audio = self.decoder.decode(path)?;

        info!(
            tag = report.tag_region.label(),
            sample_rate = audio.sample_rate(),
            channels = audio.channels(),
            frames = audio.frames(),
            "Ingested track"
        );

        Ok(IngestedTrack { report, audio })
    }
}
