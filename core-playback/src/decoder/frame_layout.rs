//! # Frame Layout Check
//!
//! Walks the MPEG Layer III frame headers of a file and reports a final frame
//! that runs past the end of the audio region.
//!
//! Symphonia's demuxer ends a stream cut off mid-frame with the same
//! `UnexpectedEof` it uses for a clean end, so the session runs this once the
//! demuxer is exhausted.
//!
//! ```text
//! [ID3v2 header] [frame][frame]...[frame] [ID3v1 trailer]
//!                ^ audio region start      ^ audio region end
//! ```

use crate::error::{DecodeError, Result};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

const ID3V2_MARKER: &[u8; 3] = b"ID3";
const ID3V2_HEADER_LEN: usize = 10;
const ID3V2_FOOTER_FLAG: u8 = 0x10;

const ID3V1_MARKER: &[u8; 3] = b"TAG";
const ID3V1_TAG_LEN: usize = 128;

const FRAME_HEADER_LEN: usize = 4;

// Layer III bitrates in kbps, indexed by the header's 4-bit bitrate field.
const BITRATES_MPEG1: [usize; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const BITRATES_MPEG2: [usize; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

const SAMPLE_RATES_MPEG1: [usize; 3] = [44100, 48000, 32000];
const SAMPLE_RATES_MPEG2: [usize; 3] = [22050, 24000, 16000];
const SAMPLE_RATES_MPEG25: [usize; 3] = [11025, 12000, 8000];

/// Result of walking the frame chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameLayout {
    /// Every frame found ends inside the audio region
    Complete { frames: usize },
    /// The frame at `offset` needs `frame_len` bytes but only `available` remain
    Truncated {
        offset: usize,
        frame_len: usize,
        available: usize,
    },
}

/// Byte length of the Layer III frame starting with `header`, including the
/// header itself. `None` if the bytes are not a usable Layer III header.
///
/// Free-format bitrates cannot be sized from the header and are treated as
/// not a header.
pub(crate) fn frame_len(header: [u8; 4]) -> Option<usize> {
    if header[0] != 0xFF || header[1] & 0xE0 != 0xE0 {
        return None;
    }

    let version = (header[1] >> 3) & 0x03;
    let layer = (header[1] >> 1) & 0x03;
    if version == 0x01 || layer != 0x01 {
        return None;
    }

    let bitrate_index = (header[2] >> 4) as usize;
    let rate_index = ((header[2] >> 2) & 0x03) as usize;
    if bitrate_index == 0 || bitrate_index == 0x0F || rate_index == 0x03 {
        return None;
    }

    let padding = ((header[2] >> 1) & 0x01) as usize;

    let (kbps, sample_rate, coefficient) = match version {
        0x03 => (BITRATES_MPEG1[bitrate_index], SAMPLE_RATES_MPEG1[rate_index], 144),
        0x02 => (BITRATES_MPEG2[bitrate_index], SAMPLE_RATES_MPEG2[rate_index], 72),
        _ => (BITRATES_MPEG2[bitrate_index], SAMPLE_RATES_MPEG25[rate_index], 72),
    };

    Some(coefficient * kbps * 1000 / sample_rate + padding)
}

/// Start and end offsets of the bytes between the ID3v2 header and the ID3v1
/// trailer.
fn audio_region(data: &[u8]) -> (usize, usize) {
    let mut start = 0;
    if data.len() >= ID3V2_HEADER_LEN && data.starts_with(ID3V2_MARKER) {
        // Synchsafe: 7 significant bits per byte
        let size = data[6..10]
            .iter()
            .fold(0usize, |acc, &b| (acc << 7) | (b & 0x7F) as usize);
        let footer = if data[5] & ID3V2_FOOTER_FLAG != 0 {
            ID3V2_HEADER_LEN
        } else {
            0
        };
        start = (ID3V2_HEADER_LEN + size + footer).min(data.len());
    }

    let mut end = data.len();
    if data.len() >= start + ID3V1_TAG_LEN && data[data.len() - ID3V1_TAG_LEN..].starts_with(ID3V1_MARKER) {
        end = data.len() - ID3V1_TAG_LEN;
    }

    (start, end)
}

/// Walk the frame chain of an in-memory MP3 file.
///
/// Bytes that do not form a header are skipped one at a time. A truncated
/// frame is only reported when it directly follows a complete one, so junk
/// that happens to contain a sync word is never mistaken for audio.
pub(crate) fn scan(data: &[u8]) -> FrameLayout {
    let (mut pos, end) = audio_region(data);
    let mut frames = 0;
    let mut in_sync = false;

    while pos + FRAME_HEADER_LEN <= end {
        let header = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];

        match frame_len(header) {
            Some(len) if pos + len <= end => {
                frames += 1;
                pos += len;
                in_sync = true;
            }
            Some(len) if in_sync => {
                return FrameLayout::Truncated {
                    offset: pos,
                    frame_len: len,
                    available: end - pos,
                };
            }
            _ => {
                pos += 1;
                in_sync = false;
            }
        }
    }

    FrameLayout::Complete { frames }
}

/// Fail with `StreamRead` if the file at `path` ends inside a frame.
pub(crate) fn verify_complete(path: &Path, source_name: &str) -> Result<()> {
    let data = fs::read(path)?;

    match scan(&data) {
        FrameLayout::Complete { frames } => {
            trace!(file = %source_name, frames, "Frame chain complete");
            Ok(())
        }
        FrameLayout::Truncated {
            offset,
            frame_len,
            available,
        } => {
            warn!(
                file = %source_name,
                offset,
                frame_len,
                available,
                "Stream ends inside a frame"
            );
            Err(DecodeError::StreamRead(format!(
                "Stream truncated: frame at byte {} needs {} bytes, {} remain",
                offset, frame_len, available
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];

    fn frames(count: usize) -> Vec<u8> {
        let mut data = Vec::new();
        for _ in 0..count {
            let start = data.len();
            data.extend(FRAME);
            data.resize(start + 417, 0);
        }
        data
    }

    fn trailer() -> Vec<u8> {
        let mut tag = b"TAG".to_vec();
        tag.resize(ID3V1_TAG_LEN, 0);
        tag
    }

    #[test]
    fn test_frame_len_mpeg1_layer3() {
        assert_eq!(frame_len(FRAME), Some(417));
        // Padding bit adds one byte
        assert_eq!(frame_len([0xFF, 0xFB, 0x92, 0xC0]), Some(418));
        // 320 kbps at 48 kHz
        assert_eq!(frame_len([0xFF, 0xFB, 0xE4, 0x00]), Some(960));
    }

    #[test]
    fn test_frame_len_mpeg2_layer3() {
        // MPEG-2, 64 kbps, 22.05 kHz
        assert_eq!(frame_len([0xFF, 0xF3, 0x80, 0xC0]), Some(208));
    }

    #[test]
    fn test_frame_len_rejects_non_headers() {
        assert_eq!(frame_len([0x00, 0x00, 0x00, 0x00]), None);
        // Free-format bitrate
        assert_eq!(frame_len([0xFF, 0xFB, 0x00, 0xC0]), None);
        // Bad bitrate index
        assert_eq!(frame_len([0xFF, 0xFB, 0xF0, 0xC0]), None);
        // Reserved sample rate
        assert_eq!(frame_len([0xFF, 0xFB, 0x9C, 0xC0]), None);
        // Layer II
        assert_eq!(frame_len([0xFF, 0xFD, 0x90, 0xC0]), None);
    }

    #[test]
    fn test_scan_whole_frames() {
        assert_eq!(scan(&frames(5)), FrameLayout::Complete { frames: 5 });
    }

    #[test]
    fn test_scan_detects_cut_final_frame() {
        let mut data = frames(10);
        data.truncate(417 * 9 + 100);

        assert_eq!(
            scan(&data),
            FrameLayout::Truncated {
                offset: 417 * 9,
                frame_len: 417,
                available: 100,
            }
        );
    }

    #[test]
    fn test_scan_skips_tag_regions() {
        let mut data = vec![b'I', b'D', b'3', 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A];
        data.extend([0u8; 10]);
        data.extend(frames(3));
        data.extend(trailer());

        assert_eq!(scan(&data), FrameLayout::Complete { frames: 3 });
    }

    #[test]
    fn test_scan_cut_before_trailer() {
        let mut data = frames(4);
        data.truncate(417 * 3 + 50);
        data.extend(trailer());

        assert!(matches!(scan(&data), FrameLayout::Truncated { available: 50, .. }));
    }

    #[test]
    fn test_scan_ignores_trailing_junk() {
        let mut data = frames(3);
        data.extend(b"APETAGEX junk that is not audio");

        assert_eq!(scan(&data), FrameLayout::Complete { frames: 3 });
    }

    #[test]
    fn test_scan_sync_word_in_junk_is_not_truncation() {
        let mut data = vec![0x11u8; 64];
        data.extend(FRAME);
        data.extend([0u8; 20]);

        assert_eq!(scan(&data), FrameLayout::Complete { frames: 0 });
    }

    #[test]
    fn test_scan_empty() {
        assert_eq!(scan(&[]), FrameLayout::Complete { frames: 0 });
    }
}
