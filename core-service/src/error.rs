use crate::validator::Rejection;
use thiserror::Error;

/// Failure of an ingest request.
///
/// Problems reading the ID3v1 record are not here: they are logged by the
/// validator and leave `ValidationReport::metadata` empty.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("File rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] core_playback::DecodeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_pick_matching_variant() {
        let rejected: CoreError = Rejection::NoTagEvidence.into();
        assert!(matches!(rejected, CoreError::Rejected(Rejection::NoTagEvidence)));

        let config: CoreError = core_runtime::Error::Config("bad".to_string()).into();
        assert!(matches!(config, CoreError::Config(_)));

        let decode: CoreError = core_playback::DecodeError::EmptyStream.into();
        assert!(matches!(decode, CoreError::Decode(core_playback::DecodeError::EmptyStream)));
    }

    #[test]
    fn test_display_prefixes_source() {
        let err = CoreError::from(Rejection::NotFound);
        assert_eq!(err.to_string(), "File rejected: File does not exist");
    }
}
