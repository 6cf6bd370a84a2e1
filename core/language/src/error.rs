use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying an embedding store.
#[derive(Debug, Error)]
pub enum LanguageError {
    /// The store at `path` could not be loaded.
    #[error("failed to load embedding store from {}: {reason}", .path.display())]
    StoreLoad { path: PathBuf, reason: String },

    /// The requested key is not in the store.
    #[error("key not found in embedding store: {0}")]
    KeyNotFound(String),

    #[error("invalid key (expected word|sense): {0}")]
    InvalidKey(String),

    #[error("vector for {key} has {actual} dims, store expects {expected}")]
    DimensionMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("vector for {0} contains NaN or infinite values")]
    NonFiniteVector(String),
}

impl LanguageError {
    pub(crate) fn store_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LanguageError::StoreLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LanguageError>;
