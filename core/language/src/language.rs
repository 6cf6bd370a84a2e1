use sensevec_schemas::{Embedding, EmbeddingSet, ScoredEmbedding};
use std::path::Path;
use tracing::debug;

use crate::config::LanguageConfig;
use crate::error::Result;
use crate::store::{EmbeddingStore, Sense2VecStore};

/// Neighbours returned when the caller does not ask for a count
pub const DEFAULT_N: usize = 10;

/// One key, or several keys to resolve in order
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Single(String),
    Batch(Vec<String>),
}

impl From<&str> for Query {
    fn from(key: &str) -> Self {
        Query::Single(key.to_string())
    }
}

impl From<String> for Query {
    fn from(key: String) -> Self {
        Query::Single(key)
    }
}

impl From<Vec<String>> for Query {
    fn from(keys: Vec<String>) -> Self {
        Query::Batch(keys)
    }
}

impl From<&[&str]> for Query {
    fn from(keys: &[&str]) -> Self {
        Query::Batch(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Query {
    fn from(keys: [&str; N]) -> Self {
        Query::Batch(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Result of [`Sense2VecLanguage::lookup`], shaped like the query
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieved {
    Embedding(Embedding),
    Set(EmbeddingSet),
}

impl Retrieved {
    pub fn into_embedding(self) -> Option<Embedding> {
        match self {
            Retrieved::Embedding(embedding) => Some(embedding),
            Retrieved::Set(_) => None,
        }
    }

    pub fn into_set(self) -> Option<EmbeddingSet> {
        match self {
            Retrieved::Set(set) => Some(set),
            Retrieved::Embedding(_) => None,
        }
    }
}

/// Fetches embeddings and neighbour sets from a sense vector store.
///
/// This is a retrieval adapter: it owns the store handle, turns keys such as
/// `bank|NOUN` into [`Embedding`]s and reshapes the store's similarity results.
/// It never caches and never changes the store.
///
/// ```no_run
/// use sensevec_language::Sense2VecLanguage;
///
/// let lang = Sense2VecLanguage::from_path("/path/to/s2v_reddit_2015_md")?;
/// let bank = lang.embedding("bank|NOUN")?;
/// let similar = lang.embset_similar("bank|NOUN", 5)?;
/// # Ok::<(), sensevec_language::LanguageError>(())
/// ```
pub struct Sense2VecLanguage {
    store: Box<dyn EmbeddingStore>,
    default_n: usize,
}

impl Sense2VecLanguage {
    pub fn new(store: Box<dyn EmbeddingStore>) -> Self {
        Self {
            store,
            default_n: DEFAULT_N,
        }
    }

    /// Load the on-disk store at `path`. Fails with `StoreLoad`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Sense2VecStore::from_disk(path)?;
        Ok(Self::new(Box::new(store)))
    }

    pub fn from_config(config: &LanguageConfig) -> Result<Self> {
        Ok(Self::from_path(&config.store_path)?.with_default_n(config.default_n))
    }

    pub fn with_default_n(mut self, n: usize) -> Self {
        self.default_n = n;
        self
    }

    pub fn default_n(&self) -> usize {
        self.default_n
    }

    pub fn store(&self) -> &dyn EmbeddingStore {
        self.store.as_ref()
    }

    /// Resolve a single key or a batch of keys
    pub fn lookup(&self, query: impl Into<Query>) -> Result<Retrieved> {
        match query.into() {
            Query::Single(key) => self.embedding(&key).map(Retrieved::Embedding),
            Query::Batch(keys) => self.embset(keys.as_slice()).map(Retrieved::Set),
        }
    }

    /// The embedding stored under `key`, named after it
    pub fn embedding(&self, key: &str) -> Result<Embedding> {
        let vector = self.store.vector(key)?;
        Ok(Embedding::new(key, vector))
    }

    /// One embedding per key, in order. Stops at the first missing key.
    pub fn embset<S: AsRef<str>>(&self, keys: &[S]) -> Result<EmbeddingSet> {
        keys.iter()
            .map(|key| self.embedding(key.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(EmbeddingSet::new)
    }

    /// The `n` keys most similar to `query`, as a named set
    pub fn embset_similar(&self, query: &str, n: usize) -> Result<EmbeddingSet> {
        let embeddings = self
            .score_similar(query, n)?
            .into_iter()
            .map(|scored| scored.embedding)
            .collect();

        Ok(EmbeddingSet::new(embeddings).with_name(format!("Embset[s2v similar_{}:{}]", n, query)))
    }

    pub fn embset_similar_default(&self, query: &str) -> Result<EmbeddingSet> {
        self.embset_similar(query, self.default_n)
    }

    /// The `n` keys most similar to `query` with their scores, best first
    pub fn score_similar(&self, query: &str, n: usize) -> Result<Vec<ScoredEmbedding>> {
        let neighbours = self.store.most_similar(query, n)?;
        debug!("{} neighbours for {} (asked for {})", neighbours.len(), query, n);

        neighbours
            .into_iter()
            .map(|(key, score)| -> Result<ScoredEmbedding> {
                Ok(ScoredEmbedding {
                    embedding: self.embedding(&key)?,
                    score,
                })
            })
            .collect()
    }

    pub fn score_similar_default(&self, query: &str) -> Result<Vec<ScoredEmbedding>> {
        self.score_similar(query, self.default_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LanguageError;
    use crate::store::InMemoryStore;

    fn language() -> Sense2VecLanguage {
        let store = InMemoryStore::from_pairs(vec![
            ("duck|NOUN", vec![1.0, 0.0]),
            ("duck|VERB", vec![0.0, 1.0]),
            ("goose|NOUN", vec![0.9, 0.2]),
            ("swan|NOUN", vec![0.8, 0.3]),
            ("dodge|VERB", vec![0.1, 0.9]),
        ])
        .unwrap();
        Sense2VecLanguage::new(Box::new(store))
    }

    #[test]
    fn test_single_lookup() {
        let lang = language();
        let emb = lang.lookup("duck|NOUN").unwrap().into_embedding().unwrap();
        assert_eq!(emb.name(), "duck|NOUN");
        assert_eq!(emb.vector(), &[1.0, 0.0]);
    }

    #[test]
    fn test_batch_lookup_keeps_order() {
        let lang = language();
        let set = lang
            .lookup(["duck|NOUN", "duck|VERB"])
            .unwrap()
            .into_set()
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set[0].vector(), &[1.0, 0.0]);
        assert_eq!(set[1].vector(), &[0.0, 1.0]);
        assert_eq!(set.name(), None);
    }

    #[test]
    fn test_missing_key() {
        let lang = language();
        match lang.lookup("nonexistent|NOUN") {
            Err(LanguageError::KeyNotFound(key)) => assert_eq!(key, "nonexistent|NOUN"),
            other => panic!("expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_fails_on_first_missing_key() {
        let lang = language();
        let result = lang.embset(&["duck|NOUN", "missing|NOUN", "also_missing|NOUN"]);
        assert!(matches!(
            result,
            Err(LanguageError::KeyNotFound(key)) if key == "missing|NOUN"
        ));
    }

    #[test]
    fn test_empty_batch() {
        let lang = language();
        let set = lang.embset::<&str>(&[]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_embset_similar() {
        let lang = language();
        let set = lang.embset_similar("duck|NOUN", 2).unwrap();

        assert_eq!(set.name(), Some("Embset[s2v similar_2:duck|NOUN]"));
        assert_eq!(set.names(), vec!["goose|NOUN", "swan|NOUN"]);
    }

    #[test]
    fn test_similar_with_large_n() {
        let lang = language();
        assert_eq!(lang.embset_similar("duck|NOUN", 100).unwrap().len(), 4);
        assert!(lang.embset_similar("duck|NOUN", 0).unwrap().is_empty());
    }

    #[test]
    fn test_score_similar_is_ranked() {
        let lang = language();
        let scored = lang.score_similar("duck|VERB", 4).unwrap();

        assert_eq!(scored.len(), 4);
        assert_eq!(scored[0].embedding.name(), "dodge|VERB");
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_similar_missing_query() {
        let lang = language();
        assert!(matches!(
            lang.score_similar("nonexistent|NOUN", 3),
            Err(LanguageError::KeyNotFound(_))
        ));
        assert!(matches!(
            lang.embset_similar("nonexistent|NOUN", 3),
            Err(LanguageError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_default_n() {
        let lang = language().with_default_n(1);
        assert_eq!(lang.default_n(), 1);
        assert_eq!(lang.embset_similar_default("duck|NOUN").unwrap().len(), 1);
        assert_eq!(lang.score_similar_default("duck|NOUN").unwrap().len(), 1);
        assert_eq!(language().default_n(), DEFAULT_N);
    }

    #[test]
    fn test_from_path_missing_store() {
        let result = Sense2VecLanguage::from_path("/definitely/not/a/store");
        assert!(matches!(result, Err(LanguageError::StoreLoad { .. })));
    }
}
