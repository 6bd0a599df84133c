//! Similarity computation and ranking.

use std::cmp::Ordering;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::document::Document;
use crate::error::{IndexError, Result};

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means same direction
/// - 0.0 means orthogonal vectors, or either vector is all zeros
/// - -1.0 means opposite vectors
///
/// Sums are accumulated in `f64`, so any finite `f32` input neither
/// overflows nor underflows to zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    // A zero vector has no direction.
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (magnitude_a * magnitude_b);
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Compute the dot product between two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(IndexError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum())
}

/// Euclidean norm of a vector.
pub fn magnitude(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt()
}

/// A stored document paired with its similarity to a query.
#[derive(Debug, Clone)]
pub struct Ranked {
    /// Similarity score at full precision.
    pub score: f32,

    /// The matched document.
    pub document: Arc<Document>,
}

/// Ordering used for search results: score descending, then id ascending.
///
/// Ids are unique within a store, so this is a total order and repeated
/// searches over the same state return the same sequence.
fn ranking_order(a: &Ranked, b: &Ranked) -> Ordering {
    OrderedFloat(b.score)
        .cmp(&OrderedFloat(a.score))
        .then_with(|| a.document.id.cmp(&b.document.id))
}

/// Score every candidate against `query` and return the `k` best.
pub fn rank_top_k(query: &[f32], candidates: Vec<Arc<Document>>, k: usize) -> Result<Vec<Ranked>> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut scored = Vec::with_capacity(candidates.len());
    for document in candidates {
        let score = cosine_similarity(query, &document.embedding)?;
        scored.push(Ranked { score, document });
    }

    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, ranking_order);
        scored.truncate(k);
    }
    scored.sort_by(ranking_order);

    Ok(scored)
}
