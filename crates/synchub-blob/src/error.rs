//! Error types for blob storage operations.

use std::io;
use thiserror::Error;

/// Result type for blob storage operations.
pub type Result<T> = std::result::Result<T, BlobError>;

/// Errors that can occur while storing or reading uploaded files.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid stored name: {0}")]
    InvalidName(String),

    #[error("no stored file named {0}")]
    NotFound(String),
}

impl BlobError {
    /// True when the error means the requested blob does not exist.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            BlobError::NotFound(_) => true,
            BlobError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
