//! Durable index behaviour across reopen.

use std::sync::Arc;

use docqa_vector_index::{FileStore, IndexError, VectorIndex, VectorStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[tokio::test]
async fn test_search_results_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("documents.json");

    let before = {
        let index = VectorIndex::open(&path).await.unwrap();
        assert_eq!(index.backend(), "file");
        index
            .add_document("rust", "Rust is fast.", vec![0.9, 0.1, 0.0])
            .await
            .unwrap();
        index
            .add_document("go", "Go has goroutines.", vec![0.1, 0.9, 0.0])
            .await
            .unwrap();
        index
            .add_document("zig", "Zig is small.", vec![0.7, 0.0, 0.7])
            .await
            .unwrap();
        index.search(&[1.0, 0.0, 0.0], 3).await.unwrap()
    };

    let index = VectorIndex::open(&path).await.unwrap();
    assert_eq!(index.count().await, 3);
    assert_eq!(index.search(&[1.0, 0.0, 0.0], 3).await.unwrap(), before);

    // The reloaded index still enforces the stored dimension.
    assert!(matches!(
        index.add_document("c", "C", vec![1.0, 0.0]).await,
        Err(IndexError::DimensionMismatch { expected: 3, actual: 2 })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_durable_upserts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("documents.json");
    let store = Arc::new(FileStore::open(&path).await.unwrap());
    let index = Arc::new(VectorIndex::with_store(store.clone()));

    let mut handles = Vec::new();
    for i in 0..24 {
        let index = Arc::clone(&index);
        handles.push(tokio::spawn(async move {
            index
                .add_document(format!("doc-{i}"), format!("text {i}"), vec![i as f32, 1.0])
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    index.flush().await.unwrap();
    drop(index);
    drop(store);

    let reopened = FileStore::open(&path).await.unwrap();
    assert_eq!(reopened.count().await, 24);
    assert_eq!(reopened.get("doc-7").await.unwrap().text, "text 7");
}
