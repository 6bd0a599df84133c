//! Durable record store backed by a JSON snapshot file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::{IndexError, Result, StorageError};
use crate::store::{MemoryStore, UpsertOutcome, VectorStore};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    dimension: Option<usize>,
    documents: Vec<&'a Document>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    dimension: Option<usize>,
    documents: Vec<Document>,
}

/// A [`VectorStore`] that survives process restarts.
///
/// Reads are served from an in-memory [`MemoryStore`]. A write first
/// renames a complete snapshot of the resulting state into place and only
/// then applies the change in memory, so readers never see a record that
/// is not on disk. A failed or cancelled snapshot leaves memory untouched.
pub struct FileStore {
    path: PathBuf,
    records: MemoryStore,
    /// Serializes writers so snapshots are written in commit order.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading an existing snapshot if present.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_inner(path.as_ref(), None).await
    }

    /// Open the store at `path`, requiring every embedding to have
    /// `dimension` components.
    pub async fn open_with_dimension(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        Self::open_inner(path.as_ref(), Some(dimension)).await
    }

    async fn open_inner(path: &Path, dimension: Option<usize>) -> Result<Self> {
        let path = path.to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::CreateDirectory(format!("{}: {e}", parent.display()))
            })?;
        }

        let snapshot = if fs::try_exists(&path).await? {
            Some(Self::read_snapshot(&path).await?)
        } else {
            None
        };

        let fixed = match (dimension, snapshot.as_ref().and_then(|s| s.dimension)) {
            (Some(configured), Some(stored)) if configured != stored => {
                return Err(IndexError::DimensionMismatch {
                    expected: configured,
                    actual: stored,
                });
            }
            (configured, stored) => configured.or(stored),
        };

        let records = match fixed {
            Some(dimension) => MemoryStore::with_dimension(dimension)?,
            None => MemoryStore::new(),
        };

        if let Some(snapshot) = snapshot {
            let total = snapshot.documents.len();
            for document in snapshot.documents {
                let id = document.id.clone();
                if records.replace(document).await?.is_some() {
                    return Err(StorageError::Corrupt(format!(
                        "{}: duplicate id {id}",
                        path.display()
                    ))
                    .into());
                }
            }
            info!("Loaded {total} documents from {}", path.display());
        }

        Ok(Self {
            path,
            records,
            write_lock: Mutex::new(()),
        })
    }

    async fn read_snapshot(path: &Path) -> Result<Snapshot> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::ReadFile(format!("{}: {e}", path.display())))?;

        let snapshot: Snapshot = serde_json::from_str(&content)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StorageError::Corrupt(format!(
                "{}: unsupported snapshot version {}",
                path.display(),
                snapshot.version
            ))
            .into());
        }
        Ok(snapshot)
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `documents` to disk as the whole store. Callers hold `write_lock`.
    async fn persist(
        &self,
        mut documents: Vec<Arc<Document>>,
        dimension: Option<usize>,
    ) -> Result<()> {
        documents.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            dimension,
            documents: documents.iter().map(Arc::as_ref).collect(),
        };
        let content = serde_json::to_vec(&snapshot)?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string());
        let tmp_path = self.path.with_file_name(format!("{file_name}.tmp"));

        let write_err =
            |e: std::io::Error| StorageError::WriteFile(format!("{}: {e}", tmp_path.display()));
        let mut file = fs::File::create(&tmp_path).await.map_err(write_err)?;
        file.write_all(&content).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StorageError::WriteFile(format!("{}: {e}", self.path.display())))?;

        debug!(
            "Persisted {} documents to {}",
            snapshot.documents.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl VectorStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn dimension(&self) -> Option<usize> {
        self.records.dimension()
    }

    async fn upsert(&self, document: Document) -> Result<UpsertOutcome> {
        let _guard = self.write_lock.lock().await;
        self.records.check_acceptable(&document)?;

        let id = document.id.clone();
        let document = Arc::new(document);
        let mut documents = self.records.all_records().await;
        documents.retain(|existing| existing.id != id);
        documents.push(Arc::clone(&document));
        let dimension = self.records.dimension().or(Some(document.dimension()));

        if let Err(e) = self.persist(documents, dimension).await {
            warn!("Upsert of {id} not applied: {e}");
            return Err(e);
        }

        let previous = self.records.replace_shared(document).await?;
        Ok(if previous.is_some() {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Inserted
        })
    }

    async fn get(&self, id: &str) -> Result<Arc<Document>> {
        self.records.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.records.get(id).await?;

        let mut documents = self.records.all_records().await;
        documents.retain(|existing| existing.id != id);
        if let Err(e) = self.persist(documents, self.records.dimension()).await {
            warn!("Delete of {id} not applied: {e}");
            return Err(e);
        }

        self.records.take(id).await?;
        Ok(())
    }

    async fn count(&self) -> usize {
        self.records.count().await
    }

    async fn all_records(&self) -> Vec<Arc<Document>> {
        self.records.all_records().await
    }

    async fn flush(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let documents = self.records.all_records().await;
        self.persist(documents, self.records.dimension()).await
    }
}
