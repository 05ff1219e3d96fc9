//! # Tag Scanning & Metadata Module
//!
//! Classifies audio files by their legacy ID3 tag layout and extracts the
//! fixed-width ID3v1 metadata fields.
//!
//! ## Overview
//!
//! This module handles:
//! - Binary tag sniffing at fixed offsets (`ID3` header, `TAG` trailer)
//! - ID3v1/ID3v1.1 field extraction (title, artist, album, year, comment,
//!   track, genre)
//!
//! Both operations are stateless and work per call on a path or on any
//! `Read + Seek` source.

pub mod error;
pub mod extractor;
pub mod tag_scanner;

pub use error::{MetadataError, Result};
pub use extractor::{MetadataExtractor, MetadataRecord};
pub use tag_scanner::{TagRegion, TagScanner};
