use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read tag region: {0}")]
    ReadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
