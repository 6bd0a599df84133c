//! Stored document records.

use serde::{Deserialize, Serialize};

use crate::Embedding;
use crate::error::{IndexError, Result};

/// A document held by the index: caller-supplied id, its text, and the
/// externally computed embedding of that text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque, non-empty identifier.
    pub id: String,

    /// Document text (may be empty).
    pub text: String,

    /// Embedding vector.
    pub embedding: Embedding,

    /// Associated metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Document {
    /// Create a new document without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            metadata: None,
        }
    }

    /// Attach metadata to the document.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Dimension of the document's embedding.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Check the record-level requirements shared by every store backend.
    ///
    /// Dimension agreement with the rest of the store is checked by the
    /// store itself.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(IndexError::InvalidArgument(
                "document id must not be empty".to_string(),
            ));
        }
        validate_vector(&self.embedding, "embedding")
    }
}

/// Reject empty vectors and vectors with NaN or infinite components.
pub(crate) fn validate_vector(vector: &[f32], what: &str) -> Result<()> {
    if vector.is_empty() {
        return Err(IndexError::InvalidArgument(format!(
            "{what} must not be empty"
        )));
    }
    if let Some(position) = vector.iter().position(|x| !x.is_finite()) {
        return Err(IndexError::InvalidArgument(format!(
            "{what} has a non-finite component at position {position}"
        )));
    }
    Ok(())
}
