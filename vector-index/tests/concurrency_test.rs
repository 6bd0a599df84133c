//! Concurrent access to the index.
//!
//! The store is required to be safe under concurrent upserts and searches;
//! these tests run many writers and readers on a multi-threaded runtime.

use std::sync::Arc;

use docqa_vector_index::{Document, VectorIndex};
use pretty_assertions::assert_eq;

const DIMENSION: usize = 8;

fn embedding_for(seed: usize) -> Vec<f32> {
    (0..DIMENSION)
        .map(|i| ((seed * 31 + i * 7) % 17) as f32 - 8.0)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_all_visible() {
    let index = Arc::new(VectorIndex::in_memory());
    let n = 200;

    let mut handles = Vec::with_capacity(n);
    for i in 0..n {
        let index = Arc::clone(&index);
        handles.push(tokio::spawn(async move {
            index
                .add_document(format!("doc-{i:03}"), format!("text {i}"), embedding_for(i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(index.count().await, n);

    let results = index.search(&embedding_for(0), n).await.unwrap();
    assert_eq!(results.len(), n);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));

    let mut ids: Vec<String> = results.into_iter().map(|m| m.id).collect();
    ids.sort();
    let expected: Vec<String> = (0..n).map(|i| format!("doc-{i:03}")).collect();
    assert_eq!(ids, expected);
}

/// Writers flip each record between two consistent states while readers
/// search. Every observed match must pair text and embedding from the same
/// write.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_search_never_sees_torn_records() {
    let index = Arc::new(VectorIndex::in_memory());
    let ids: Vec<String> = (0..16).map(|i| format!("doc-{i}")).collect();
    for id in &ids {
        index
            .upsert(Document::new(id.clone(), "east", vec![1.0, 0.0]))
            .await
            .unwrap();
    }

    let mut writers = Vec::new();
    for round in 0..4 {
        let index = Arc::clone(&index);
        let ids = ids.clone();
        writers.push(tokio::spawn(async move {
            for step in 0..100 {
                let (text, embedding) = if (round + step) % 2 == 0 {
                    ("north", vec![0.0, 1.0])
                } else {
                    ("east", vec![1.0, 0.0])
                };
                let id = &ids[(round * 7 + step) % ids.len()];
                index
                    .add_document(id.clone(), text, embedding)
                    .await
                    .unwrap();
            }
        }));
    }

    let mut readers = Vec::new();
    for _ in 0..4 {
        let index = Arc::clone(&index);
        readers.push(tokio::spawn(async move {
            for _ in 0..100 {
                let results = index.search(&[1.0, 0.0], 16).await.unwrap();
                assert_eq!(results.len(), 16);
                for m in results {
                    // "east" records score 1.0 against the query, "north" 0.0.
                    let expected = if m.text == "east" { 1.0 } else { 0.0 };
                    assert!(
                        (m.score - expected).abs() < 1e-6,
                        "torn record {}: text {} score {}",
                        m.id,
                        m.text,
                        m.score
                    );
                }
            }
        }));
    }

    for handle in writers.into_iter().chain(readers) {
        handle.await.unwrap();
    }
    assert_eq!(index.count().await, 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_writes_agree_on_dimension() {
    let index = Arc::new(VectorIndex::in_memory());

    let mut handles = Vec::new();
    for i in 0..32 {
        let index = Arc::clone(&index);
        let dimension = if i % 2 == 0 { 2 } else { 3 };
        handles.push(tokio::spawn(async move {
            index
                .add_document(format!("doc-{i}"), "", vec![1.0; dimension])
                .await
                .is_ok()
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }

    // Exactly one dimension wins, and only its half of the writes land.
    assert_eq!(accepted, 16);
    assert_eq!(index.count().await, 16);
    let dimension = index.dimension().unwrap();
    for record in index.search(&vec![1.0; dimension], 32).await.unwrap() {
        assert_eq!(index.get(&record.id).await.unwrap().dimension(), dimension);
    }
}
