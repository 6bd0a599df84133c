//! Error types for the question-answering service.

use docqa_answer::AnswerError;
use docqa_embeddings::EmbeddingError;
use docqa_vector_index::IndexError;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the question-answering service.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Malformed request (empty id, empty query, non-positive `k`, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding length does not match the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No document stored under the given id.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A question was asked before any document was indexed.
    #[error("no documents have been indexed")]
    EmptyIndex,

    /// Embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Answer provider failed.
    #[error("answer error: {0}")]
    Answer(#[from] AnswerError),

    /// Durable storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification for mapping errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable.
    InvalidArgument,
    NotFound,
    EmptyIndex,
    /// A collaborator (embedding or answer provider) failed.
    Upstream,
    Internal,
}

impl RetrievalError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::DimensionMismatch { .. } => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EmptyIndex => ErrorKind::EmptyIndex,
            Self::Embedding(_) | Self::Answer(_) => ErrorKind::Upstream,
            Self::Storage(_) | Self::Config(_) => ErrorKind::Internal,
        }
    }
}

impl From<IndexError> for RetrievalError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            IndexError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            IndexError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}
