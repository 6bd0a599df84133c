//! The vector index: upsert, batch ingestion, and top-k search.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Embedding;
use crate::document::{Document, validate_vector};
use crate::error::{IndexError, Result};
use crate::file_store::FileStore;
use crate::similarity::{Ranked, rank_top_k};
use crate::store::{MemoryStore, UpsertOutcome, VectorStore};

/// A ranked search result at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub id: String,

    /// Cosine similarity to the query, in [-1, 1].
    pub score: f32,

    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl From<Ranked> for SearchMatch {
    fn from(ranked: Ranked) -> Self {
        // No clone when the record was replaced since the scan.
        let document = Arc::unwrap_or_clone(ranked.document);
        Self {
            id: document.id,
            score: ranked.score,
            text: document.text,
            metadata: document.metadata,
        }
    }
}

/// Per-item failure from [`VectorIndex::add_documents_batch`].
#[derive(Debug)]
pub struct BatchItemError {
    /// Position of the item in the submitted batch.
    pub index: usize,

    pub id: String,

    pub error: IndexError,
}

/// Result of a best-effort batch upsert.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Number of documents stored.
    pub added: usize,

    /// Items that were rejected; everything else was stored.
    pub errors: Vec<BatchItemError>,
}

impl BatchOutcome {
    /// Whether every item was stored.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Brute-force cosine similarity index over a [`VectorStore`].
///
/// The index is cheap to share: wrap it in an `Arc` and hand it to every
/// request handler. All operations take `&self` and are safe to run
/// concurrently.
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
}

impl VectorIndex {
    /// Create an index backed by any store implementation.
    pub fn with_store(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Create an empty, volatile index.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Open a durable index persisted at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = FileStore::open(path).await?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Name of the backing store.
    pub fn backend(&self) -> &str {
        self.store.name()
    }

    /// Dimension of stored embeddings, once known.
    pub fn dimension(&self) -> Option<usize> {
        self.store.dimension()
    }

    /// Add or replace a document.
    pub async fn add_document(
        &self,
        id: impl Into<String>,
        text: impl Into<String>,
        embedding: Embedding,
    ) -> Result<UpsertOutcome> {
        self.upsert(Document::new(id, text, embedding)).await
    }

    /// Add or replace a fully built document, metadata included.
    pub async fn upsert(&self, document: Document) -> Result<UpsertOutcome> {
        let id = document.id.clone();
        let text_len = document.text.len();
        let outcome = self.store.upsert(document).await?;
        match outcome {
            UpsertOutcome::Inserted => debug!("Added document {id} ({text_len} bytes)"),
            UpsertOutcome::Replaced => debug!("Updated document {id} ({text_len} bytes)"),
        }
        Ok(outcome)
    }

    /// Upsert each document independently.
    ///
    /// A failing item does not stop the rest of the batch and nothing is
    /// rolled back.
    pub async fn add_documents_batch(&self, documents: Vec<Document>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (index, document) in documents.into_iter().enumerate() {
            let id = document.id.clone();
            match self.store.upsert(document).await {
                Ok(_) => outcome.added += 1,
                Err(error) => {
                    warn!("Batch item {index} ({id}) rejected: {error}");
                    outcome.errors.push(BatchItemError { index, id, error });
                }
            }
        }
        info!(
            "Batch upsert stored {} documents, rejected {}",
            outcome.added,
            outcome.errors.len()
        );
        outcome
    }

    /// Return the `top_k` stored documents most similar to `query`.
    ///
    /// Results are ordered by score descending, ties by id ascending, and
    /// contain `min(top_k, count())` entries. An empty index or `top_k == 0`
    /// yields no results regardless of the query.
    pub async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let records = self.store.all_records().await;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        validate_vector(query, "query vector")?;
        if let Some(expected) = self.store.dimension().filter(|d| *d != query.len()) {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        let total = records.len();
        let matches: Vec<SearchMatch> = rank_top_k(query, records, top_k)?
            .into_iter()
            .map(SearchMatch::from)
            .collect();

        debug!("Ranked {total} documents, returning {}", matches.len());
        Ok(matches)
    }

    /// Fetch a stored document.
    pub async fn get(&self, id: &str) -> Result<Arc<Document>> {
        self.store.get(id).await
    }

    /// Remove a stored document.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await
    }

    /// Number of stored documents.
    pub async fn count(&self) -> usize {
        self.store.count().await
    }

    /// Whether the index holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.count().await == 0
    }

    /// Make acknowledged writes durable.
    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(matches: &[SearchMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    async fn sample_index() -> VectorIndex {
        let index = VectorIndex::in_memory();
        index.add_document("a", "alpha", vec![1.0, 0.0, 0.0]).await.unwrap();
        index.add_document("b", "bravo", vec![0.0, 1.0, 0.0]).await.unwrap();
        index.add_document("c", "charlie", vec![0.7, 0.7, 0.0]).await.unwrap();
        index.add_document("d", "delta", vec![-1.0, 0.0, 0.0]).await.unwrap();
        index
    }

    #[tokio::test]
    async fn test_search_orders_by_score() {
        let index = sample_index().await;
        let results = index.search(&[1.0, 0.0, 0.0], 3).await.unwrap();

        assert_eq!(ids(&results), vec!["a", "c", "b"]);
        assert_eq!(results[0].text, "alpha");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_search_length_is_min_of_k_and_count() {
        let index = sample_index().await;
        for k in 0..8 {
            let results = index.search(&[0.2, 0.3, 0.9], k).await.unwrap();
            assert_eq!(results.len(), k.min(4));
        }
    }

    #[tokio::test]
    async fn test_search_empty_index() {
        let index = VectorIndex::in_memory();
        assert!(index.search(&[], 5).await.unwrap().is_empty());
        assert!(index.search(&[1.0, 2.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_bad_query() {
        let index = sample_index().await;
        assert!(matches!(
            index.search(&[1.0, 0.0], 2).await,
            Err(IndexError::DimensionMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            index.search(&[], 2).await,
            Err(IndexError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_search_is_deterministic_with_ties() {
        let index = VectorIndex::in_memory();
        for id in ["m", "z", "a", "k"] {
            index.add_document(id, id, vec![1.0, 1.0]).await.unwrap();
        }

        let first = index.search(&[1.0, 1.0], 4).await.unwrap();
        for _ in 0..5 {
            assert_eq!(index.search(&[1.0, 1.0], 4).await.unwrap(), first);
        }
        assert_eq!(ids(&first), vec!["a", "k", "m", "z"]);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let index = VectorIndex::in_memory();
        index.add_document("x", "text", vec![1.0, 2.0]).await.unwrap();
        index.add_document("x", "text", vec![1.0, 2.0]).await.unwrap();

        assert_eq!(index.count().await, 1);
        assert_eq!(
            *index.get("x").await.unwrap(),
            Document::new("x", "text", vec![1.0, 2.0])
        );
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let index = VectorIndex::in_memory();
        index.add_document("id", "A", vec![1.0, 0.0]).await.unwrap();
        let outcome = index.add_document("id", "B", vec![0.0, 1.0]).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(index.count().await, 1);
        let doc = index.get("id").await.unwrap();
        assert_eq!((doc.text.as_str(), doc.embedding.clone()), ("B", vec![0.0, 1.0]));

        let results = index.search(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(results[0].text, "B");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_batch_is_best_effort() {
        let index = VectorIndex::in_memory();
        let outcome = index
            .add_documents_batch(vec![
                Document::new("a", "one", vec![1.0, 0.0]),
                Document::new("", "bad id", vec![1.0, 0.0]),
                Document::new("b", "wrong dim", vec![1.0, 0.0, 0.0]),
                Document::new("c", "three", vec![0.0, 1.0]),
            ])
            .await;

        assert_eq!(outcome.added, 2);
        assert!(!outcome.is_complete());
        let failed: Vec<usize> = outcome.errors.iter().map(|e| e.index).collect();
        assert_eq!(failed, vec![1, 2]);
        assert!(matches!(
            outcome.errors[1].error,
            IndexError::DimensionMismatch { expected: 2, actual: 3 }
        ));
        assert_eq!(index.count().await, 2);
    }

    #[tokio::test]
    async fn test_zero_vector_document_scores_zero() {
        let index = VectorIndex::in_memory();
        index.add_document("zero", "", vec![0.0, 0.0]).await.unwrap();
        index.add_document("neg", "", vec![-1.0, 0.0]).await.unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(ids(&results), vec!["zero", "neg"]);
        assert_eq!(results[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_delete() {
        let index = sample_index().await;
        index.delete("a").await.unwrap();

        assert_eq!(index.count().await, 3);
        assert!(matches!(index.delete("a").await, Err(IndexError::NotFound(_))));
        let results = index.search(&[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(ids(&results), vec!["c"]);
    }
}
