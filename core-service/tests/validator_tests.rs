//! Integration tests for the container validator
//!
//! This test suite verifies:
//! - Each rejection reason, in check order
//! - Acceptance via either tag layout
//! - Metadata is reported but never required
//! - Repeated validation gives the same answer

use core_runtime::config::{IngestConfig, DEFAULT_MAX_FILE_SIZE_BYTES};
use core_service::{ContainerValidator, Rejection};
use core_metadata::TagRegion;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

// ============================================================================
// Fixtures
// ============================================================================

fn temp_with(data: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(data).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}

fn id3v2_bytes(len: usize) -> Vec<u8> {
    let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x0A".to_vec();
    data.resize(len, 0);
    data
}

fn id3v1_bytes(body_len: usize, title: &str) -> Vec<u8> {
    let mut data = vec![0x11u8; body_len];
    let mut tag = b"TAG".to_vec();
    let mut field = title.as_bytes().to_vec();
    field.resize(30, 0);
    tag.extend(field);
    tag.extend([0u8; 30]); // artist
    tag.extend([0u8; 30]); // album
    tag.extend(b"1999");
    tag.extend([0u8; 30]); // comment
    tag.push(0xFF);
    data.extend(tag);
    data
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_rejects_nonexistent_path() {
    let validator = ContainerValidator::new();
    let path = Path::new("/definitely/not/a/real/file.mp3");

    assert!(!validator.validate(path));
    assert_eq!(validator.check(path).unwrap_err(), Rejection::NotFound);
}

#[test]
fn test_rejects_directory() {
    let dir = TempDir::new().unwrap();
    let validator = ContainerValidator::new();

    assert_eq!(
        validator.check(dir.path()).unwrap_err(),
        Rejection::NotRegularFile
    );
}

#[test]
fn test_rejects_directory_named_like_mp3() {
    let dir = TempDir::new().unwrap();
    let fake = dir.path().join("album.mp3");
    std::fs::create_dir(&fake).unwrap();

    assert_eq!(
        ContainerValidator::new().check(&fake).unwrap_err(),
        Rejection::NotRegularFile
    );
}

#[test]
fn test_rejects_wav_extension() {
    let file = temp_with(&id3v2_bytes(512), ".wav");

    let rejection = ContainerValidator::new().check(file.path()).unwrap_err();

    assert_eq!(
        rejection,
        Rejection::WrongExtension {
            expected: "mp3".to_string(),
            found: Some("wav".to_string()),
        }
    );
}

#[test]
fn test_extension_is_case_sensitive() {
    let file = temp_with(&id3v2_bytes(512), ".MP3");
    assert!(matches!(
        ContainerValidator::new().check(file.path()),
        Err(Rejection::WrongExtension { .. })
    ));
}

#[test]
fn test_rejects_missing_extension() {
    let file = temp_with(&id3v2_bytes(512), "");
    assert!(matches!(
        ContainerValidator::new().check(file.path()),
        Err(Rejection::WrongExtension { found: None, .. })
    ));
}

#[test]
fn test_rejects_file_one_byte_over_ceiling() {
    let file = temp_with(&id3v2_bytes(16), ".mp3");
    file.as_file()
        .set_len(DEFAULT_MAX_FILE_SIZE_BYTES + 1)
        .unwrap();

    assert_eq!(
        ContainerValidator::new().check(file.path()).unwrap_err(),
        Rejection::TooLarge {
            size: DEFAULT_MAX_FILE_SIZE_BYTES + 1,
            limit: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    );
}

#[test]
fn test_accepts_file_exactly_at_ceiling() {
    let file = temp_with(&id3v2_bytes(16), ".mp3");
    file.as_file().set_len(DEFAULT_MAX_FILE_SIZE_BYTES).unwrap();

    let report = ContainerValidator::new().check(file.path()).unwrap();
    assert_eq!(report.file_size, DEFAULT_MAX_FILE_SIZE_BYTES);
}

#[test]
fn test_configured_ceiling_applies() {
    let config = IngestConfig::builder()
        .max_file_size_bytes(256)
        .build()
        .unwrap();
    let validator = ContainerValidator::with_config(config);

    let small = temp_with(&id3v2_bytes(256), ".mp3");
    let large = temp_with(&id3v2_bytes(257), ".mp3");

    assert!(validator.validate(small.path()));
    assert!(matches!(
        validator.check(large.path()),
        Err(Rejection::TooLarge { size: 257, limit: 256 })
    ));
}

#[test]
fn test_rejects_untagged_file() {
    let file = temp_with(&[0xFFu8; 4096], ".mp3");
    assert_eq!(
        ContainerValidator::new().check(file.path()).unwrap_err(),
        Rejection::NoTagEvidence
    );
}

#[test]
fn test_rejects_empty_file() {
    let file = temp_with(&[], ".mp3");
    assert_eq!(
        ContainerValidator::new().check(file.path()).unwrap_err(),
        Rejection::NoTagEvidence
    );
}

#[test]
fn test_extension_checked_before_size() {
    let config = IngestConfig::builder()
        .max_file_size_bytes(8)
        .build()
        .unwrap();
    let file = temp_with(&[0u8; 64], ".ogg");

    assert!(matches!(
        ContainerValidator::with_config(config).check(file.path()),
        Err(Rejection::WrongExtension { .. })
    ));
}

// ============================================================================
// Acceptance
// ============================================================================

#[test]
fn test_accepts_id3v2_header() {
    let file = temp_with(&id3v2_bytes(1024), ".mp3");

    let report = ContainerValidator::new().check(file.path()).unwrap();

    assert_eq!(report.tag_region, TagRegion::LegacyV2);
    assert!(report.metadata.is_none());
    assert_eq!(report.file_size, 1024);
}

#[test]
fn test_accepts_id3v1_trailer_with_metadata() {
    let file = temp_with(&id3v1_bytes(2000, "Trailer Song"), ".mp3");

    let report = ContainerValidator::new().check(file.path()).unwrap();

    assert_eq!(report.tag_region, TagRegion::LegacyV1);
    let metadata = report.metadata.expect("ID3v1 metadata");
    assert_eq!(metadata.title, "Trailer Song");
    assert_eq!(metadata.year, "1999");
    assert_eq!(metadata.genre, None);
}

#[test]
fn test_header_wins_but_metadata_still_read() {
    let mut data = id3v1_bytes(600, "Both Tags");
    data[..3].copy_from_slice(b"ID3");

    let file = temp_with(&data, ".mp3");
    let report = ContainerValidator::new().check(file.path()).unwrap();

    assert_eq!(report.tag_region, TagRegion::LegacyV2);
    assert_eq!(report.metadata.unwrap().title, "Both Tags");
}

#[test]
fn test_validation_is_idempotent() {
    let accepted = temp_with(&id3v2_bytes(300), ".mp3");
    let rejected = temp_with(&[0u8; 300], ".mp3");
    let validator = ContainerValidator::new();

    for _ in 0..3 {
        assert!(validator.validate(accepted.path()));
        assert!(!validator.validate(rejected.path()));
    }

    assert_eq!(
        validator.check(accepted.path()).unwrap(),
        validator.check(accepted.path()).unwrap()
    );
}

#[test]
fn test_report_serializes_region_label() {
    let file = temp_with(&id3v2_bytes(128), ".mp3");
    let report = ContainerValidator::new().check(file.path()).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"tag_region\":\"ID3v2\""));
    assert!(json.contains("\"file_size\":128"));
}
