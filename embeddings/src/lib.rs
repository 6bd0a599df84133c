//! # Embeddings
//!
//! Turns text into dense vectors for the document index.
//!
//! ## Features
//!
//! - **Provider trait**: [`EmbeddingProvider`] is the seam the service calls;
//!   tests and alternative backends implement it directly
//! - **OpenAI-compatible provider**: `/embeddings` over HTTP with API key,
//!   model selection, batch requests, and rate-limit reporting
//!
//! Failures are reported as [`EmbeddingError`] so callers can tell an
//! upstream outage apart from their own validation errors.

pub mod error;
pub mod provider;

pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
