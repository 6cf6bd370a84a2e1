use super::table::VectorTable;
use super::EmbeddingStore;
use crate::error::{LanguageError, Result};

/// In-memory store, handy for injection and test fixtures
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    table: VectorTable,
}

impl InMemoryStore {
    pub fn new(dims: usize) -> Self {
        Self {
            table: VectorTable::new(dims),
        }
    }

    /// Build a store from `(key, vector)` pairs. The first vector fixes the width.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<f32>)>,
        K: Into<String>,
    {
        let mut pairs = pairs.into_iter().peekable();
        let dims = pairs.peek().map(|(_, v)| v.len()).unwrap_or(0);

        let mut store = Self::new(dims);
        for (key, vector) in pairs {
            store.insert(key, vector)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, key: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        self.table.push(key.into(), vector)
    }

    pub fn keys(&self) -> &[String] {
        self.table.keys()
    }
}

impl EmbeddingStore for InMemoryStore {
    fn vector(&self, key: &str) -> Result<Vec<f32>> {
        self.table
            .get(key)
            .map(<[f32]>::to_vec)
            .ok_or_else(|| LanguageError::KeyNotFound(key.to_string()))
    }

    fn most_similar(&self, key: &str, n: usize) -> Result<Vec<(String, f32)>> {
        self.table.most_similar(key, n)
    }

    fn contains(&self, key: &str) -> bool {
        self.table.contains(key)
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn dims(&self) -> usize {
        self.table.dims()
    }
}
