//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the MP3 ingest core:
//! - Logging and tracing infrastructure
//! - Ingest configuration (size ceiling, extension, decode chunking)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other crates depend on.
//! It establishes the logging conventions and the shared configuration used
//! by validation and decoding.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{IngestConfig, IngestConfigBuilder};
pub use error::{Error, Result};
