//! Core service façade for MP3 ingest.
//!
//! Composes the tag scanner and metadata extractor (`core-metadata`) into a
//! [`ContainerValidator`], and pairs it with the streaming decoder
//! (`core-playback`) in [`IngestService`]. Hosts supply a file path and get
//! back either a typed rejection or a normalized PCM buffer plus whatever
//! ID3v1 metadata the file carried.
//!
//! The interactive prompt loop lives outside the library; see
//! `examples/ingest_prompt.rs`.

pub mod error;
pub mod ingest;
pub mod validator;

pub use error::{CoreError, Result};
pub use ingest::{IngestService, IngestedTrack};
pub use validator::{ContainerValidator, Rejection, ValidationReport};
