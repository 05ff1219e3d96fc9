//! # Ingest Configuration Module
//!
//! Provides the tunables shared by file validation and decoding.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an
//! `IngestConfig`. Every field has a default matching the fixed limits of the
//! ingest pipeline, so `IngestConfig::default()` is always a valid
//! configuration. The builder enforces fail-fast validation so that a bad
//! override is reported before any file is touched.
//!
//! ## Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | `max_file_size_bytes` | 5 MiB |
//! | `required_extension` | `mp3` |
//! | `chunk_size_bytes` | 8192 |
//! | `max_consecutive_decode_errors` | 10 |
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::IngestConfig;
//!
//! let config = IngestConfig::builder()
//!     .chunk_size_bytes(4096)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.chunk_size_bytes, 4096);
//! assert_eq!(config.required_extension, "mp3");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::IngestConfig;
//!
//! // Chunks must hold whole 16-bit samples
//! let config = IngestConfig::builder()
//!     .chunk_size_bytes(8191)
//!     .build()
//!     .expect("Should fail - odd chunk size");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest file accepted for decoding (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Extension (without the dot) a candidate file must carry.
pub const DEFAULT_REQUIRED_EXTENSION: &str = "mp3";

/// Size of each PCM chunk pulled from the codec session.
pub const DEFAULT_CHUNK_SIZE_BYTES: usize = 8192;

/// Corrupt packets tolerated in a row before a stream is declared broken.
pub const DEFAULT_MAX_CONSECUTIVE_DECODE_ERRORS: usize = 10;

/// Configuration for validating and decoding a single audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Files strictly larger than this are rejected
    pub max_file_size_bytes: u64,

    /// Case-sensitive extension, without the leading dot
    pub required_extension: String,

    /// Bytes requested from the codec per read; must be even
    pub chunk_size_bytes: usize,

    /// Corrupt packets skipped in a row before decoding fails
    pub max_consecutive_decode_errors: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            required_extension: DEFAULT_REQUIRED_EXTENSION.to_string(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            max_consecutive_decode_errors: DEFAULT_MAX_CONSECUTIVE_DECODE_ERRORS,
        }
    }
}

impl IngestConfig {
    /// Creates a new builder seeded with the defaults.
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::default()
    }

    /// Loads a configuration from JSON, filling missing fields with defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::IngestConfig;
    ///
    /// let config = IngestConfig::from_json_str(r#"{ "chunk_size_bytes": 2048 }"#).unwrap();
    /// assert_eq!(config.chunk_size_bytes, 2048);
    /// assert_eq!(config.max_file_size_bytes, 5 * 1024 * 1024);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: IngestConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The size ceiling is non-zero
    /// - The extension is non-empty and carries no leading dot
    /// - The chunk size is non-zero and even (whole 16-bit samples)
    /// - The consecutive error budget is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_bytes == 0 {
            return Err(Error::Config(
                "Maximum file size must be greater than 0 bytes".to_string(),
            ));
        }

        if self.required_extension.is_empty() {
            return Err(Error::Config(
                "Required extension cannot be empty".to_string(),
            ));
        }

        if self.required_extension.starts_with('.') {
            return Err(Error::Config(format!(
                "Required extension must not start with a dot: {}",
                self.required_extension
            )));
        }

        if self.chunk_size_bytes == 0 {
            return Err(Error::Config(
                "Chunk size must be greater than 0 bytes".to_string(),
            ));
        }

        if self.chunk_size_bytes % 2 != 0 {
            return Err(Error::Config(format!(
                "Chunk size must be a multiple of 2 bytes (16-bit samples), got {}",
                self.chunk_size_bytes
            )));
        }

        if self.max_consecutive_decode_errors == 0 {
            return Err(Error::Config(
                "Consecutive decode error budget must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`IngestConfig`] instances.
///
/// Unset fields keep their defaults. Call
/// [`build()`](IngestConfigBuilder::build) to validate and produce the config.
#[derive(Debug, Default)]
pub struct IngestConfigBuilder {
    max_file_size_bytes: Option<u64>,
    required_extension: Option<String>,
    chunk_size_bytes: Option<usize>,
    max_consecutive_decode_errors: Option<usize>,
}

impl IngestConfigBuilder {
    /// Sets the size ceiling in bytes.
    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = Some(bytes);
        self
    }

    /// Sets the required extension (without the leading dot).
    pub fn required_extension(mut self, extension: impl Into<String>) -> Self {
        self.required_extension = Some(extension.into());
        self
    }

    /// Sets the PCM chunk size in bytes.
    pub fn chunk_size_bytes(mut self, bytes: usize) -> Self {
        self.chunk_size_bytes = Some(bytes);
        self
    }

    /// Sets how many corrupt packets in a row are tolerated.
    pub fn max_consecutive_decode_errors(mut self, count: usize) -> Self {
        self.max_consecutive_decode_errors = Some(count);
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any override fails [`IngestConfig::validate`].
    pub fn build(self) -> Result<IngestConfig> {
        let defaults = IngestConfig::default();

        let config = IngestConfig {
            max_file_size_bytes: self
                .max_file_size_bytes
                .unwrap_or(defaults.max_file_size_bytes),
            required_extension: self
                .required_extension
                .unwrap_or(defaults.required_extension),
            chunk_size_bytes: self.chunk_size_bytes.unwrap_or(defaults.chunk_size_bytes),
            max_consecutive_decode_errors: self
                .max_consecutive_decode_errors
                .unwrap_or(defaults.max_consecutive_decode_errors),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_limits() {
        let config = IngestConfig::default();
        assert_eq!(config.max_file_size_bytes, 5_242_880);
        assert_eq!(config.required_extension, "mp3");
        assert_eq!(config.chunk_size_bytes, 8192);
        assert_eq!(config.max_consecutive_decode_errors, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_without_overrides_equals_default() {
        let config = IngestConfig::builder().build().unwrap();
        assert_eq!(config, IngestConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = IngestConfig::builder()
            .max_file_size_bytes(1024)
            .required_extension("mp2")
            .chunk_size_bytes(512)
            .max_consecutive_decode_errors(3)
            .build()
            .unwrap();

        assert_eq!(config.max_file_size_bytes, 1024);
        assert_eq!(config.required_extension, "mp2");
        assert_eq!(config.chunk_size_bytes, 512);
        assert_eq!(config.max_consecutive_decode_errors, 3);
    }

    #[test]
    fn test_builder_rejects_zero_size_ceiling() {
        let result = IngestConfig::builder().max_file_size_bytes(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_bad_extension() {
        assert!(IngestConfig::builder().required_extension("").build().is_err());

        let err = IngestConfig::builder()
            .required_extension(".mp3")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("dot"));
    }

    #[test]
    fn test_builder_rejects_odd_or_zero_chunk() {
        assert!(IngestConfig::builder().chunk_size_bytes(0).build().is_err());

        let err = IngestConfig::builder()
            .chunk_size_bytes(8191)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("multiple of 2"));
    }

    #[test]
    fn test_builder_rejects_zero_error_budget() {
        let result = IngestConfig::builder()
            .max_consecutive_decode_errors(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_partial_document() {
        let config =
            IngestConfig::from_json_str(r#"{ "max_file_size_bytes": 100 }"#).unwrap();
        assert_eq!(config.max_file_size_bytes, 100);
        assert_eq!(config.chunk_size_bytes, DEFAULT_CHUNK_SIZE_BYTES);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let result = IngestConfig::from_json_str(r#"{ "chunk_size_bytes": 3 }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        let result = IngestConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_config_serializes_round_trip_fields() {
        let json = serde_json::to_string(&IngestConfig::default()).unwrap();
        assert!(json.contains("\"required_extension\":\"mp3\""));
    }
}
