//! Error types for answer generation.

use thiserror::Error;

/// Result type alias for answer operations.
pub type Result<T> = std::result::Result<T, AnswerError>;

/// Errors that can occur while generating an answer.
#[derive(Error, Debug)]
pub enum AnswerError {
    /// Provider not configured.
    #[error("answer provider not configured")]
    ProviderNotConfigured,

    /// API returned a non-success status.
    #[error("API request failed with status {status}: {body}")]
    ApiRequest { status: u16, body: String },

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
