pub mod config;
pub mod error;
pub mod key;
pub mod language;
pub mod store;

pub use config::LanguageConfig;
pub use error::LanguageError;
pub use key::{make_key, split_key};
pub use language::{Query, Retrieved, Sense2VecLanguage, DEFAULT_N};
pub use store::{EmbeddingStore, InMemoryStore, Sense2VecStore, StoreCfg, FORMAT_VERSION};

pub use sensevec_schemas::{Embedding, EmbeddingSet, ScoredEmbedding, SchemaError};
