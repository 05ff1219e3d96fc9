//! # Binary Tag Scanner
//!
//! Classifies a byte stream by the legacy ID3 layout it carries.
//!
//! ## Layout
//!
//! | Offset | Variant | Marker |
//! |--------|---------|--------|
//! | 0 | ID3v2 (header prefix) | `ID3` |
//! | EOF-128 | ID3v1 (fixed trailer) | `TAG` |
//!
//! The header is checked first and wins outright: once `ID3` matches, the
//! trailer is never read. The ID3v2 size field is not parsed; the marker
//! alone is taken as evidence of an MP3 container.

use crate::error::{MetadataError, Result};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// Marker at offset 0 of a file carrying an ID3v2 header.
pub const ID3V2_MARKER: &[u8; 3] = b"ID3";

/// Marker at `EOF - 128` of a file carrying an ID3v1 trailer.
pub const ID3V1_MARKER: &[u8; 3] = b"TAG";

/// Total size of an ID3v1 trailer, marker included.
pub const ID3V1_TAG_SIZE: u64 = 128;

/// Which legacy tag layout a file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRegion {
    /// Neither marker present
    None,
    /// Fixed 128-byte trailer (`TAG` at EOF-128)
    LegacyV1,
    /// Variable-length header prefix (`ID3` at offset 0)
    LegacyV2,
}

impl TagRegion {
    /// Returns `true` if either legacy layout matched.
    pub fn is_tagged(&self) -> bool {
        !matches!(self, TagRegion::None)
    }

    /// Short human-readable label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            TagRegion::None => "none",
            TagRegion::LegacyV1 => "ID3v1",
            TagRegion::LegacyV2 => "ID3v2",
        }
    }
}

/// Stateless scanner for legacy tag markers.
pub struct TagScanner;

impl TagScanner {
    /// Classify the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::FileNotFound` if the path does not exist and
    /// `MetadataError::Io` for any other open or seek failure. A file too
    /// short to hold a marker is not an error; it classifies as
    /// [`TagRegion::None`].
    pub fn scan(path: &Path) -> Result<TagRegion> {
        let mut file = open_file(path)?;
        let region = Self::scan_reader(&mut file)?;
        debug!(region = region.label(), "Scanned tag region");
        Ok(region)
    }

    /// Classify any seekable byte source.
    ///
    /// The reader is left positioned at an unspecified offset.
    pub fn scan_reader<R: Read + Seek>(reader: &mut R) -> Result<TagRegion> {
        reader.seek(SeekFrom::Start(0))?;

        let mut header = [0u8; 3];
        if read_marker(reader, &mut header)? && &header == ID3V2_MARKER {
            trace!("ID3v2 header marker found at offset 0");
            return Ok(TagRegion::LegacyV2);
        }

        if has_trailer_marker(reader)? {
            trace!("ID3v1 trailer marker found at EOF-128");
            return Ok(TagRegion::LegacyV1);
        }

        Ok(TagRegion::None)
    }
}

/// Open `path` for reading, mapping a missing file to `FileNotFound`.
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MetadataError::FileNotFound(path.display().to_string()),
        _ => MetadataError::Io(e),
    })
}

/// Seek to the start of the ID3v1 trailer and check its marker.
///
/// On `true` the reader sits just past the marker, at the title field.
pub(crate) fn has_trailer_marker<R: Read + Seek>(reader: &mut R) -> Result<bool> {
    let len = reader.seek(SeekFrom::End(0))?;
    if len < ID3V1_TAG_SIZE {
        trace!(len, "Source shorter than an ID3v1 trailer");
        return Ok(false);
    }

    reader.seek(SeekFrom::Start(len - ID3V1_TAG_SIZE))?;

    let mut marker = [0u8; 3];
    Ok(read_marker(reader, &mut marker)? && &marker == ID3V1_MARKER)
}

/// Fill `buf` completely; a short source yields `Ok(false)`.
fn read_marker<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(MetadataError::ReadFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn with_trailer(body_len: usize) -> Vec<u8> {
        let mut data = vec![0x55u8; body_len];
        let mut trailer = vec![0u8; ID3V1_TAG_SIZE as usize];
        trailer[..3].copy_from_slice(ID3V1_MARKER);
        data.extend_from_slice(&trailer);
        data
    }

    #[test]
    fn test_header_marker_classifies_v2() {
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec();
        data.resize(512, 0);
        let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
        assert_eq!(region, TagRegion::LegacyV2);
    }

    #[test]
    fn test_header_wins_over_trailer() {
        let mut data = with_trailer(256);
        data[..3].copy_from_slice(ID3V2_MARKER);
        let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
        assert_eq!(region, TagRegion::LegacyV2);
    }

    #[test]
    fn test_trailer_marker_classifies_v1() {
        let data = with_trailer(1000);
        let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
        assert_eq!(region, TagRegion::LegacyV1);
    }

    #[test]
    fn test_trailer_only_file_of_exactly_128_bytes() {
        let data = with_trailer(0);
        assert_eq!(data.len(), 128);
        let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
        assert_eq!(region, TagRegion::LegacyV1);
    }

    #[test]
    fn test_trailer_marker_at_wrong_offset_is_ignored() {
        let mut data = with_trailer(200);
        data.push(0);
        let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
        assert_eq!(region, TagRegion::None);
    }

    #[test]
    fn test_short_sources_classify_none() {
        for len in [0usize, 1, 2, 3, 64, 127] {
            let data = vec![b'T'; len];
            let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
            assert_eq!(region, TagRegion::None, "length {}", len);
        }
    }

    #[test]
    fn test_short_source_with_partial_header() {
        let region = TagScanner::scan_reader(&mut Cursor::new(b"ID".to_vec())).unwrap();
        assert_eq!(region, TagRegion::None);
    }

    #[test]
    fn test_untagged_source() {
        let data = vec![0xFFu8; 4096];
        let region = TagScanner::scan_reader(&mut Cursor::new(data)).unwrap();
        assert_eq!(region, TagRegion::None);
    }

    #[test]
    fn test_region_helpers() {
        assert!(!TagRegion::None.is_tagged());
        assert!(TagRegion::LegacyV1.is_tagged());
        assert!(TagRegion::LegacyV2.is_tagged());
        assert_eq!(TagRegion::LegacyV1.label(), "ID3v1");
        assert_eq!(TagRegion::LegacyV2.label(), "ID3v2");
        assert_eq!(TagRegion::None.label(), "none");
    }
}
