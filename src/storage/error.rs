//! Storage error types
//!
//! Defines all errors that can occur in the storage layer.

use thiserror::Error;

/// Errors that can occur in the entry store or the file shelf
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Room token is not 8 ASCII alphanumerics (or `default`)
    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    /// File name is not a single plain path component
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Requested shelf file does not exist
    #[error("File not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
