//! # Container Validator
//!
//! Decides whether a candidate path is worth handing to the decoder.
//!
//! ## Checks
//!
//! Run in this order; the first failure wins:
//!
//! 1. The path exists
//! 2. It is a regular file (not a directory or device)
//! 3. Its extension equals the configured one, case-sensitively
//! 4. Its size does not exceed the configured ceiling
//! 5. The tag scanner finds an ID3v2 header or an ID3v1 trailer
//!
//! On acceptance the ID3v1 record is read as a best-effort extra. A failure
//! there is logged and never turns an accepted file into a rejected one.

use core_metadata::{MetadataExtractor, MetadataRecord, TagRegion, TagScanner};
use core_runtime::config::IngestConfig;
use core_runtime::logging::strip_path;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Why a candidate file was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("File does not exist")]
    NotFound,

    #[error("Path is not a regular file")]
    NotRegularFile,

    #[error("File is not an .{expected} file (found {found:?})")]
    WrongExtension {
        expected: String,
        found: Option<String>,
    },

    #[error("File is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("No ID3v1 or ID3v2 tag found")]
    NoTagEvidence,

    #[error("File could not be read: {0}")]
    Unreadable(String),
}

/// What validation learned about an accepted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Which tag layout proved the container
    #[serde(serialize_with = "serialize_region")]
    pub tag_region: TagRegion,
    /// ID3v1 record, when a trailer was present and readable
    pub metadata: Option<MetadataRecord>,
    /// Size on disk in bytes
    pub file_size: u64,
}

fn serialize_region<S: serde::Serializer>(region: &TagRegion, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(region.label())
}

/// Pre-decode gatekeeper for candidate MP3 files.
#[derive(Debug, Clone, Default)]
pub struct ContainerValidator {
    config: IngestConfig,
}

impl ContainerValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Accept or reject `path`.
    ///
    /// Diagnostics for either outcome are emitted as `tracing` events.
    pub fn validate(&self, path: &Path) -> bool {
        self.check(path).is_ok()
    }

    /// Run every check and describe the outcome.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] encountered, in the order listed in the
    /// module documentation.
    #[instrument(skip(self, path), fields(file = %strip_path(&path.to_string_lossy())))]
    pub fn check(&self, path: &Path) -> Result<ValidationReport, Rejection> {
        let outcome = self.run_checks(path);

        match &outcome {
            Ok(report) => info!(
                tag = report.tag_region.label(),
                size = report.file_size,
                has_metadata = report.metadata.is_some(),
                "Accepted MP3 file"
            ),
            Err(rejection) => warn!(reason = %rejection, "Rejected file"),
        }

        outcome
    }

    fn run_checks(&self, path: &Path) -> Result<ValidationReport, Rejection> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Rejection::NotFound,
            _ => Rejection::Unreadable(e.to_string()),
        })?;

        if !metadata.is_file() {
            return Err(Rejection::NotRegularFile);
        }

        let extension = path.extension().and_then(|ext| ext.to_str());
        if extension != Some(self.config.required_extension.as_str()) {
            return Err(Rejection::WrongExtension {
                expected: self.config.required_extension.clone(),
                found: extension.map(str::to_string),
            });
        }

        let file_size = metadata.len();
        if file_size > self.config.max_file_size_bytes {
            return Err(Rejection::TooLarge {
                size: file_size,
                limit: self.config.max_file_size_bytes,
            });
        }

        let tag_region = TagScanner::scan(path).map_err(|e| Rejection::Unreadable(e.to_string()))?;
        if !tag_region.is_tagged() {
            return Err(Rejection::NoTagEvidence);
        }

        let metadata = match MetadataExtractor::extract(path) {
            Ok(Some(record)) => {
                info!(
                    title = %record.title,
                    artist = %record.artist,
                    album = %record.album,
                    year = %record.year,
                    "ID3v1 metadata"
                );
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read ID3v1 metadata");
                None
            }
        };

        Ok(ValidationReport {
            tag_region,
            metadata,
            file_size,
        })
    }
}
