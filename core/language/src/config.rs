use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::language::DEFAULT_N;

/// Where to find the store and how many neighbours to return by default
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageConfig {
    pub store_path: PathBuf,
    pub default_n: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::new(),
            default_n: DEFAULT_N,
        }
    }
}

impl LanguageConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let store_path = std::env::var("SENSE2VEC_PATH")
            .map(PathBuf::from)
            .context("SENSE2VEC_PATH must point at a sense vector store")?;

        let default_n = match std::env::var("SENSE2VEC_TOP_N") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SENSE2VEC_TOP_N is not a count: {}", raw))?,
            Err(_) => DEFAULT_N,
        };

        Ok(Self {
            store_path,
            default_n,
        })
    }
}
