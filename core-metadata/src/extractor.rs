//! ID3v1 Metadata Extraction
//!
//! Reads the fixed-width fields of a 128-byte ID3v1 trailer.
//!
//! ## Layout
//!
//! | Offset (from EOF) | Field | Width |
//! |-------------------|-------|-------|
//! | -128 | marker `TAG` | 3 |
//! | -125 | title | 30 |
//! | -95 | artist | 30 |
//! | -65 | album | 30 |
//! | -35 | year | 4 |
//! | -31 | comment (ID3v1.1: 28 + zero byte + track) | 30 |
//! | -1 | genre index | 1 |
//!
//! Fields are ISO-8859-1 text padded with NULs (or, by some taggers, spaces).
//! A field that fills its whole width carries no terminator, so every field is
//! capped at its declared width rather than scanned for a NUL.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::MetadataExtractor;
//! use std::path::Path;
//!
//! if let Some(record) = MetadataExtractor::extract(Path::new("song.mp3"))? {
//!     println!("{}", record);
//! }
//! ```

use crate::error::Result;
use crate::tag_scanner::{has_trailer_marker, open_file};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

const TEXT_FIELD_WIDTH: usize = 30;
const YEAR_FIELD_WIDTH: usize = 4;
/// Bytes following the `TAG` marker.
const TRAILER_BODY_SIZE: usize = 125;

/// Genre byte meaning "no genre set".
const GENRE_UNSET: u8 = 0xFF;

/// Metadata carried by an ID3v1 trailer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Track title
    pub title: String,
    /// Performing artist
    pub artist: String,
    /// Album name
    pub album: String,
    /// Release year, as stored (not parsed)
    pub year: String,
    /// Free-form comment
    pub comment: String,
    /// Track number (ID3v1.1 only)
    pub track: Option<u8>,
    /// Raw genre index; `None` when unset
    pub genre: Option<u8>,
}

impl MetadataRecord {
    /// Parse the 125 bytes that follow the `TAG` marker.
    pub fn from_trailer_body(body: &[u8; TRAILER_BODY_SIZE]) -> Self {
        let (title, rest) = body.split_at(TEXT_FIELD_WIDTH);
        let (artist, rest) = rest.split_at(TEXT_FIELD_WIDTH);
        let (album, rest) = rest.split_at(TEXT_FIELD_WIDTH);
        let (year, rest) = rest.split_at(YEAR_FIELD_WIDTH);
        let (comment, genre) = rest.split_at(TEXT_FIELD_WIDTH);

        // ID3v1.1: a zero at comment[28] followed by a non-zero track byte
        let (comment, track) = if comment[28] == 0 && comment[29] != 0 {
            (&comment[..28], Some(comment[29]))
        } else {
            (comment, None)
        };

        Self {
            title: decode_field(title),
            artist: decode_field(artist),
            album: decode_field(album),
            year: decode_field(year),
            comment: decode_field(comment),
            track,
            genre: match genre[0] {
                GENRE_UNSET => None,
                index => Some(index),
            },
        }
    }

    /// Returns `true` if every text field is blank and no track or genre is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.artist.is_empty()
            && self.album.is_empty()
            && self.year.is_empty()
            && self.comment.is_empty()
            && self.track.is_none()
            && self.genre.is_none()
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title : {}", self.title)?;
        writeln!(f, "Artist: {}", self.artist)?;
        writeln!(f, "Album : {}", self.album)?;
        write!(f, "Year  : {}", self.year)?;
        if let Some(track) = self.track {
            write!(f, "\nTrack : {}", track)?;
        }
        Ok(())
    }
}

/// Stateless ID3v1 extractor.
///
/// Always re-checks the trailer marker itself instead of trusting an earlier
/// scan, so it can be called on any file.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract the ID3v1 record from the file at `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` - trailer present
    /// - `Ok(None)` - no `TAG` marker at EOF-128 (expected, not an error)
    /// - `Err(_)` - the file could not be opened or read
    pub fn extract(path: &Path) -> Result<Option<MetadataRecord>> {
        let mut file = open_file(path)?;
        let record = Self::extract_reader(&mut file)?;

        match &record {
            Some(record) => debug!(title = %record.title, artist = %record.artist, "Extracted ID3v1 record"),
            None => debug!("No ID3v1 trailer present"),
        }

        Ok(record)
    }

    /// Extract the ID3v1 record from any seekable byte source.
    pub fn extract_reader<R: Read + Seek>(reader: &mut R) -> Result<Option<MetadataRecord>> {
        if !has_trailer_marker(reader)? {
            return Ok(None);
        }

        let mut body = [0u8; TRAILER_BODY_SIZE];
        reader.read_exact(&mut body)?;

        Ok(Some(MetadataRecord::from_trailer_body(&body)))
    }
}

/// Decode one fixed-width ISO-8859-1 field.
///
/// Stops at the first NUL or at the field width, whichever comes first, and
/// drops trailing space padding. Control characters are removed wherever they
/// appear: the C0 range (tab and newline included), DEL, and the Latin-1 C1
/// range 0x80-0x9F.
fn decode_field(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());

    raw[..end]
        .iter()
        .map(|&b| char::from(b))
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim_end()
        .to_string()
}
