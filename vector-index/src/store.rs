//! Document record storage.
//!
//! The [`VectorStore`] trait is the upsert/get/scan contract the index is
//! written against. [`MemoryStore`] keeps records in lock-sharded hash maps;
//! [`crate::FileStore`] layers a durable snapshot on top of it.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::Document;
use crate::error::{IndexError, Result};

/// Number of lock shards used by [`MemoryStore::new`].
pub const DEFAULT_SHARDS: usize = 16;

/// Whether an upsert created a record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Storage contract for document records.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short name of the backend, used in logs.
    fn name(&self) -> &str;

    /// Dimension every stored embedding has, once it is known.
    fn dimension(&self) -> Option<usize>;

    /// Store `document`, replacing any record with the same id.
    ///
    /// Fails with `InvalidArgument` for an empty id or embedding and with
    /// `DimensionMismatch` when the embedding disagrees with the store.
    async fn upsert(&self, document: Document) -> Result<UpsertOutcome>;

    /// Fetch the record stored under `id`.
    async fn get(&self, id: &str) -> Result<Arc<Document>>;

    /// Remove the record stored under `id`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Number of distinct ids currently stored.
    async fn count(&self) -> usize;

    /// Every stored record, in no particular order.
    async fn all_records(&self) -> Vec<Arc<Document>>;

    /// Make all acknowledged writes durable. A no-op for volatile stores.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

type Shard = RwLock<HashMap<String, Arc<Document>>>;

/// In-memory record store.
///
/// Records are immutable once stored; an upsert swaps in a new `Arc`, so a
/// reader holding a record never observes a mix of old and new fields.
/// Each shard has its own reader/writer lock, so searches only contend with
/// writers touching the same shard.
pub struct MemoryStore {
    shards: Vec<Shard>,
    dimension: OnceLock<usize>,
}

impl MemoryStore {
    /// Create an empty store whose dimension is fixed by the first upsert.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create an empty store with a fixed number of lock shards.
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            shards,
            dimension: OnceLock::new(),
        }
    }

    /// Create an empty store that only accepts `dimension`-length vectors.
    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidArgument(
                "dimension must be positive".to_string(),
            ));
        }
        let store = Self::new();
        store.dimension.get_or_init(|| dimension);
        Ok(store)
    }

    fn shard(&self, id: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let slot = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[slot]
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        let expected = *self.dimension.get_or_init(|| actual);
        if expected != actual {
            return Err(IndexError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }

    /// Validate and store `document`, returning the record it replaced.
    pub(crate) async fn replace(&self, document: Document) -> Result<Option<Arc<Document>>> {
        self.replace_shared(Arc::new(document)).await
    }

    /// Like [`MemoryStore::replace`], for a record that is already shared.
    pub(crate) async fn replace_shared(
        &self,
        document: Arc<Document>,
    ) -> Result<Option<Arc<Document>>> {
        document.validate()?;
        self.check_dimension(document.dimension())?;

        let id = document.id.clone();
        let previous = self.shard(&id).write().await.insert(id, document);
        Ok(previous)
    }

    /// Check that `document` would be accepted, without storing it or fixing
    /// the dimension.
    pub(crate) fn check_acceptable(&self, document: &Document) -> Result<()> {
        document.validate()?;
        match self.dimension.get() {
            Some(&expected) if expected != document.dimension() => {
                Err(IndexError::DimensionMismatch {
                    expected,
                    actual: document.dimension(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Remove `id`, returning the removed record.
    pub(crate) async fn take(&self, id: &str) -> Result<Arc<Document>> {
        self.shard(id)
            .write()
            .await
            .remove(id)
            .ok_or_else(|| IndexError::NotFound(id.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get().copied()
    }

    async fn upsert(&self, document: Document) -> Result<UpsertOutcome> {
        let id = document.id.clone();
        let outcome = match self.replace(document).await? {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        };
        debug!("Stored document {id} ({outcome:?})");
        Ok(outcome)
    }

    async fn get(&self, id: &str) -> Result<Arc<Document>> {
        self.shard(id)
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| IndexError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.take(id).await?;
        debug!("Deleted document {id}");
        Ok(())
    }

    async fn count(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.len();
        }
        total
    }

    async fn all_records(&self) -> Vec<Arc<Document>> {
        let mut records = Vec::new();
        for shard in &self.shards {
            records.extend(shard.read().await.values().cloned());
        }
        records
    }
}
