//! Embedding store backends.
//!
//! The adapter only talks to [`EmbeddingStore`]; vector storage and
//! nearest-neighbour ranking live behind it.

mod memory;
mod sense2vec;
mod table;

pub use memory::InMemoryStore;
pub use sense2vec::{Sense2VecStore, StoreCfg, FORMAT_VERSION};

use crate::error::Result;

/// Read-only mapping from `word|sense` keys to vectors, plus similarity search.
pub trait EmbeddingStore: Send + Sync {
    /// Vector stored under `key`, or `KeyNotFound`.
    fn vector(&self, key: &str) -> Result<Vec<f32>>;

    /// Up to `n` other keys closest to `key`, best first.
    fn most_similar(&self, key: &str, n: usize) -> Result<Vec<(String, f32)>>;

    fn contains(&self, key: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of every vector in the store
    fn dims(&self) -> usize;
}

/// Cosine of the angle between two rows.
///
/// Width mismatches, zero rows and scores that overflow to a non-finite
/// value all come out as 0.0, so ranking never sees NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a * norm_b);
    if score.is_finite() {
        score
    } else {
        0.0
    }
}
