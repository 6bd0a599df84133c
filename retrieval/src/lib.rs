//! # Retrieval QA
//!
//! Retrieval-augmented question answering over an embedded document index.
//!
//! - **Vector index**: documents and their embeddings, cosine top-k search
//! - **Embeddings**: text to vector through an [`EmbeddingProvider`]
//! - **Answers**: grounded completions through an [`AnswerProvider`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         RetrievalQa                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │  Embedding   │  │    Vector    │  │    Answer    │           │
//! │  │   Provider   │  │    Index     │  │   Provider   │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! │         │                 │                  │                  │
//! │         └─────────────────┼──────────────────┘                  │
//! │                           ▼                                     │
//! │            add / batch / search / ask / health                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docqa_retrieval::{AddDocumentRequest, AskRequest, RetrievalConfig, RetrievalQa};
//!
//! let engine = RetrievalQa::new(RetrievalConfig::from_env()?).await?;
//!
//! engine
//!     .add_document(AddDocumentRequest::new("doc-1", "Rust has no garbage collector."))
//!     .await?;
//! let answer = engine.ask(AskRequest::new("Does Rust use a GC?")).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod schema;

pub use config::{AnswerConfig, EmbeddingConfig, QueryConfig, RetrievalConfig, StoreConfig};
pub use engine::{RetrievalQa, RetrievalQaBuilder};
pub use error::{ErrorKind, Result, RetrievalError};
pub use schema::{
    AddDocumentRequest, AddDocumentResponse, AskRequest, AskResponse, BatchAddResponse,
    BatchItemFailure, HealthResponse, SearchRequest, SearchResponse,
};

// Re-export from dependencies for convenience
pub use docqa_answer::AnswerProvider;
pub use docqa_embeddings::EmbeddingProvider;
pub use docqa_vector_index::{SearchHit, VectorIndex};
