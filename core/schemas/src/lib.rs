use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("dimension mismatch: {left} has {left_dims} dims, {right} has {right_dims}")]
    DimensionMismatch {
        left: String,
        left_dims: usize,
        right: String,
        right_dims: usize,
    },

    #[error("cannot project onto zero vector {0}")]
    ZeroVector(String),
}

// ============================================================================
// Embedding
// ============================================================================

/// A single named vector, usually the result of looking up one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    name: String,
    vector: Vec<f32>,
}

impl Embedding {
    pub fn new(name: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            vector,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn ndim(&self) -> usize {
        self.vector.len()
    }

    /// Euclidean length of the vector
    pub fn norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    pub fn into_parts(self) -> (String, Vec<f32>) {
        (self.name, self.vector)
    }

    /// Element-wise sum, named `(a + b)`
    pub fn try_add(&self, other: &Embedding) -> Result<Embedding, SchemaError> {
        self.check_dims(other)?;
        let vector = self
            .vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a + b)
            .collect();
        Ok(Embedding::new(format!("({} + {})", self.name, other.name), vector))
    }

    /// Element-wise difference, named `(a - b)`
    pub fn try_sub(&self, other: &Embedding) -> Result<Embedding, SchemaError> {
        self.check_dims(other)?;
        let vector = self
            .vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a - b)
            .collect();
        Ok(Embedding::new(format!("({} - {})", self.name, other.name), vector))
    }

    /// Projection of this vector onto `other`, named `(a >> b)`.
    ///
    /// The result is `(a·b / b·b) * b`.
    pub fn project_onto(&self, other: &Embedding) -> Result<Embedding, SchemaError> {
        self.check_dims(other)?;
        let denom = dot(&other.vector, &other.vector);
        if denom == 0.0 {
            return Err(SchemaError::ZeroVector(other.name.clone()));
        }

        let scale = dot(&self.vector, &other.vector) / denom;
        let vector = other.vector.iter().map(|b| b * scale).collect();
        Ok(Embedding::new(format!("({} >> {})", self.name, other.name), vector))
    }

    fn check_dims(&self, other: &Embedding) -> Result<(), SchemaError> {
        if self.ndim() != other.ndim() {
            return Err(SchemaError::DimensionMismatch {
                left: self.name.clone(),
                left_dims: self.ndim(),
                right: other.name.clone(),
                right_dims: other.ndim(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Emb[{}]", self.name)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

// ============================================================================
// EmbeddingSet
// ============================================================================

/// An ordered group of embeddings that share one vector space.
///
/// Sets are never changed in place; `merge` and friends return new sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSet {
    name: Option<String>,
    embeddings: Vec<Embedding>,
}

impl EmbeddingSet {
    pub fn new(embeddings: Vec<Embedding>) -> Self {
        Self {
            name: None,
            embeddings,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Embedding> {
        self.embeddings.iter()
    }

    /// First member called `name`
    pub fn get(&self, name: &str) -> Option<&Embedding> {
        self.embeddings.iter().find(|e| e.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.embeddings.iter().map(|e| e.name()).collect()
    }

    /// Dimensionality of the members, `None` for an empty set
    pub fn ndim(&self) -> Option<usize> {
        self.embeddings.first().map(Embedding::ndim)
    }

    /// Row-major matrix with one row per member
    pub fn to_matrix(&self) -> Vec<Vec<f32>> {
        self.embeddings.iter().map(|e| e.vector().to_vec()).collect()
    }

    /// New set holding this set's members followed by `other`'s.
    pub fn merge(&self, other: &EmbeddingSet) -> EmbeddingSet {
        let mut embeddings = self.embeddings.clone();
        embeddings.extend(other.embeddings.iter().cloned());

        let name = match (&self.name, &other.name) {
            (Some(a), Some(b)) => Some(format!("({} | {})", a, b)),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };

        EmbeddingSet { name, embeddings }
    }

    pub fn into_embeddings(self) -> Vec<Embedding> {
        self.embeddings
    }
}

impl fmt::Display for EmbeddingSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "EmbSet"),
        }
    }
}

impl Index<usize> for EmbeddingSet {
    type Output = Embedding;

    fn index(&self, index: usize) -> &Self::Output {
        &self.embeddings[index]
    }
}

impl IntoIterator for EmbeddingSet {
    type Item = Embedding;
    type IntoIter = std::vec::IntoIter<Embedding>;

    fn into_iter(self) -> Self::IntoIter {
        self.embeddings.into_iter()
    }
}

impl<'a> IntoIterator for &'a EmbeddingSet {
    type Item = &'a Embedding;
    type IntoIter = std::slice::Iter<'a, Embedding>;

    fn into_iter(self) -> Self::IntoIter {
        self.embeddings.iter()
    }
}

impl FromIterator<Embedding> for EmbeddingSet {
    fn from_iter<I: IntoIterator<Item = Embedding>>(iter: I) -> Self {
        EmbeddingSet::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Scored results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEmbedding {
    pub embedding: Embedding,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(name: &str, vector: &[f32]) -> Embedding {
        Embedding::new(name, vector.to_vec())
    }

    #[test]
    fn test_embedding_accessors() {
        let e = emb("duck|NOUN", &[3.0, 4.0]);
        assert_eq!(e.name(), "duck|NOUN");
        assert_eq!(e.vector(), &[3.0, 4.0]);
        assert_eq!(e.ndim(), 2);
        assert!((e.norm() - 5.0).abs() < 1e-6);
        assert_eq!(e.to_string(), "Emb[duck|NOUN]");
    }

    #[test]
    fn test_embedding_arithmetic() {
        let king = emb("king|NOUN", &[1.0, 2.0]);
        let man = emb("man|NOUN", &[0.5, 1.0]);

        let sum = king.try_add(&man).unwrap();
        assert_eq!(sum.name(), "(king|NOUN + man|NOUN)");
        assert_eq!(sum.vector(), &[1.5, 3.0]);

        let diff = king.try_sub(&man).unwrap();
        assert_eq!(diff.name(), "(king|NOUN - man|NOUN)");
        assert_eq!(diff.vector(), &[0.5, 1.0]);
    }

    #[test]
    fn test_projection() {
        let a = emb("a", &[2.0, 2.0]);
        let x_axis = emb("x", &[4.0, 0.0]);

        let projected = a.project_onto(&x_axis).unwrap();
        assert_eq!(projected.name(), "(a >> x)");
        assert_eq!(projected.vector(), &[2.0, 0.0]);

        let zero = emb("zero", &[0.0, 0.0]);
        assert_eq!(
            a.project_onto(&zero),
            Err(SchemaError::ZeroVector("zero".to_string()))
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = emb("a", &[1.0, 2.0]);
        let b = emb("b", &[1.0, 2.0, 3.0]);

        match a.try_add(&b) {
            Err(SchemaError::DimensionMismatch {
                left_dims,
                right_dims,
                ..
            }) => {
                assert_eq!(left_dims, 2);
                assert_eq!(right_dims, 3);
            }
            other => panic!("expected dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_embedding_set_basics() {
        let set = EmbeddingSet::new(vec![
            emb("duck|NOUN", &[1.0, 0.0]),
            emb("duck|VERB", &[0.0, 1.0]),
        ]);

        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.name(), None);
        assert_eq!(set.to_string(), "EmbSet");
        assert_eq!(set.names(), vec!["duck|NOUN", "duck|VERB"]);
        assert_eq!(set.ndim(), Some(2));
        assert_eq!(set[1].vector(), &[0.0, 1.0]);
        assert_eq!(set.get("duck|VERB").map(|e| e.vector()), Some(&[0.0, 1.0][..]));
        assert!(set.get("goose|NOUN").is_none());
        assert_eq!(set.to_matrix(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_empty_set() {
        let set = EmbeddingSet::default();
        assert!(set.is_empty());
        assert_eq!(set.ndim(), None);
        assert!(set.to_matrix().is_empty());
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let left = EmbeddingSet::new(vec![emb("a", &[1.0])]).with_name("left");
        let right = EmbeddingSet::new(vec![emb("b", &[2.0])]).with_name("right");

        let merged = left.merge(&right);
        assert_eq!(merged.names(), vec!["a", "b"]);
        assert_eq!(merged.name(), Some("(left | right)"));
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);

        let unnamed = EmbeddingSet::new(vec![emb("c", &[3.0])]);
        assert_eq!(left.merge(&unnamed).name(), Some("left"));
    }

    #[test]
    fn test_set_from_iterator() {
        let set: EmbeddingSet = ["x", "y"]
            .iter()
            .map(|n| emb(n, &[0.0]))
            .collect();
        let names: Vec<String> = set.into_iter().map(|e| e.into_parts().0).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_scored_embedding_serialization() {
        let scored = ScoredEmbedding {
            embedding: emb("bank|NOUN", &[0.25, 0.5]),
            score: 0.75,
        };

        let json = serde_json::to_string(&scored).unwrap();
        let restored: ScoredEmbedding = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scored);
    }
}
