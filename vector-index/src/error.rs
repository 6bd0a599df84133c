//! Error types for the vector index.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur in the vector index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Caller supplied an unusable argument (empty id, empty vector, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Vector length does not match the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No document stored under the given id.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Durable storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create the storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read the snapshot file.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write the snapshot file.
    #[error("failed to write file: {0}")]
    WriteFile(String),

    /// Snapshot content is not usable.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}
