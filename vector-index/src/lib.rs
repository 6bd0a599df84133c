//! # Vector Index
//!
//! Storage and similarity search for embedded documents, the core of the
//! document question-answering service.
//!
//! ## Features
//!
//! - **Upsert semantics**: one document per id; re-adding replaces text,
//!   embedding, and metadata together
//! - **Cosine search**: exact top-k over every stored document, ties broken
//!   by id so results are reproducible
//! - **Concurrent access**: lock-sharded store with copy-on-write records
//! - **Durable backing**: optional JSON snapshot store that survives restarts
//! - **Result shaping**: score rounding and boundary-aware text snippets
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Vector Index                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  VectorIndex ──► VectorStore ──► MemoryStore / FileStore        │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  similarity::rank_top_k ──► SearchMatch ──► format::SearchHit   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docqa_vector_index::VectorIndex;
//!
//! let index = VectorIndex::in_memory();
//! index.add_document("doc-1", "Rust is a systems language.", embedding).await?;
//! let matches = index.search(&query_embedding, 5).await?;
//! ```

pub mod document;
pub mod error;
pub mod file_store;
pub mod format;
pub mod index;
pub mod similarity;
pub mod store;

pub use document::Document;
pub use error::{IndexError, Result, StorageError};
pub use file_store::FileStore;
pub use format::{SearchHit, format_matches, round_score, snippet};
pub use index::{BatchItemError, BatchOutcome, SearchMatch, VectorIndex};
pub use similarity::cosine_similarity;
pub use store::{MemoryStore, UpsertOutcome, VectorStore};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
