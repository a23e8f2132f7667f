//! Media error types

use thiserror::Error;

/// Errors raised while validating, uploading or releasing media
#[derive(Debug, Error)]
pub enum MediaError {
    /// Content type is not an accepted image or video type
    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),

    /// Upload exceeds the configured size limit
    #[error("File too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    /// Upload is malformed (missing name, empty body)
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// A file with the same name already exists in the destination folder
    #[error("File {0} already exists")]
    AlreadyExists(String),

    /// The remote object store rejected or failed the request
    #[error("Object store error: {0}")]
    Backend(String),

    /// Local staging failed
    #[error("Staging error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        MediaError::Backend(err.to_string())
    }
}

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;
