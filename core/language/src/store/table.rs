use std::collections::HashMap;

use super::cosine_similarity;
use crate::error::{LanguageError, Result};

/// Row-ordered vectors with a key index. Shared by both backends.
#[derive(Debug, Clone)]
pub(crate) struct VectorTable {
    dims: usize,
    keys: Vec<String>,
    rows: Vec<Vec<f32>>,
    key2row: HashMap<String, usize>,
}

impl VectorTable {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            keys: Vec::new(),
            rows: Vec::new(),
            key2row: HashMap::new(),
        }
    }

    /// Append a row. A repeated key overwrites its earlier row in place.
    pub fn push(&mut self, key: String, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dims {
            return Err(LanguageError::DimensionMismatch {
                key,
                expected: self.dims,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(LanguageError::NonFiniteVector(key));
        }

        match self.key2row.get(&key) {
            Some(&row) => self.rows[row] = vector,
            None => {
                self.key2row.insert(key.clone(), self.rows.len());
                self.keys.push(key);
                self.rows.push(vector);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.key2row.get(key).map(|&row| self.rows[row].as_slice())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.key2row.contains_key(key)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Rank every other row by cosine similarity to `key`.
    ///
    /// The query itself never appears in the output. Equal scores keep row order.
    pub fn most_similar(&self, key: &str, n: usize) -> Result<Vec<(String, f32)>> {
        let query = self
            .get(key)
            .ok_or_else(|| LanguageError::KeyNotFound(key.to_string()))?;

        if n == 0 {
            return Ok(Vec::new());
        }

        let mut scores: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(row, _)| self.keys[*row] != key)
            .map(|(row, vector)| (row, cosine_similarity(query, vector)))
            .collect();

        // sort_by is stable, so ties stay in row order
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.truncate(n);

        Ok(scores
            .into_iter()
            .map(|(row, score)| (self.keys[row].clone(), score))
            .collect())
    }
}
