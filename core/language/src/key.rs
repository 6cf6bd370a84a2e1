//! Helpers for `word|sense` keys.

use crate::error::{LanguageError, Result};

/// Build a key from a surface form and a sense tag. Spaces become `_`.
pub fn make_key(word: &str, sense: &str) -> String {
    format!("{}|{}", word.replace(' ', "_"), sense)
}

/// Split a key on its last `|`, turning `_` back into spaces.
pub fn split_key(key: &str) -> Result<(String, String)> {
    let (word, sense) = key
        .rsplit_once('|')
        .ok_or_else(|| LanguageError::InvalidKey(key.to_string()))?;
    Ok((word.replace('_', " "), sense.to_string()))
}
