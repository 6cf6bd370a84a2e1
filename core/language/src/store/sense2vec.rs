use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::table::VectorTable;
use super::EmbeddingStore;
use crate::error::{LanguageError, Result};
use crate::key::{make_key, split_key};

/// On-disk layout version this crate reads
pub const FORMAT_VERSION: u32 = 1;

const CFG_FILE: &str = "cfg";
const VECTORS_FILE: &str = "vectors.db";

/// Contents of the `cfg` file at the root of a store directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreCfg {
    pub version: u32,
    pub dims: usize,
    #[serde(default)]
    pub senses: Vec<String>,
}

/// Pretrained sense vectors loaded from a store directory.
///
/// A directory holds two files:
/// - `cfg`: JSON [`StoreCfg`]
/// - `vectors.db`: SQLite table `vectors(key TEXT PRIMARY KEY, idx INTEGER NOT NULL,
///   vector BLOB NOT NULL, freq INTEGER)`, each vector stored as little-endian `f32`s
///
/// Everything is read into memory up front; the database is not kept open.
#[derive(Debug, Clone)]
pub struct Sense2VecStore {
    path: PathBuf,
    cfg: StoreCfg,
    table: VectorTable,
    freqs: HashMap<String, i64>,
}

impl Sense2VecStore {
    pub fn from_disk<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading sense vectors from {}", path.display());

        if !path.is_dir() {
            return Err(LanguageError::store_load(path, "not a directory"));
        }

        let cfg = read_cfg(path)?;
        let (table, freqs) = read_vectors(path, &cfg)?;

        info!(
            "Loaded {} sense vectors ({} dims) from {}",
            table.len(),
            cfg.dims,
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            cfg,
            table,
            freqs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cfg(&self) -> &StoreCfg {
        &self.cfg
    }

    pub fn senses(&self) -> &[String] {
        &self.cfg.senses
    }

    pub fn keys(&self) -> &[String] {
        self.table.keys()
    }

    /// Corpus frequency recorded for `key`, if any
    pub fn freq(&self, key: &str) -> Option<i64> {
        self.freqs.get(key).copied()
    }

    /// Keys for the same word under the other configured senses.
    pub fn other_senses(&self, key: &str, ignore_case: bool) -> Result<Vec<String>> {
        let (word, orig_sense) = split_key(key)?;

        let mut result: Vec<String> = Vec::new();
        for text in case_variants(&word, ignore_case) {
            for sense in &self.cfg.senses {
                if *sense == orig_sense {
                    continue;
                }
                let candidate = make_key(&text, sense);
                if self.table.contains(&candidate) && !result.contains(&candidate) {
                    result.push(candidate);
                }
            }
        }
        Ok(result)
    }

    /// The most frequent existing `word|sense` key.
    ///
    /// An empty `senses` falls back to the configured senses. Keys without a
    /// recorded frequency rank below any that have one.
    pub fn best_sense(&self, word: &str, senses: &[&str], ignore_case: bool) -> Option<String> {
        let options: Vec<&str> = if senses.is_empty() {
            self.cfg.senses.iter().map(String::as_str).collect()
        } else {
            senses.to_vec()
        };

        let variants = case_variants(word, ignore_case);
        let best = variants
            .iter()
            .flat_map(|text| options.iter().map(move |sense| make_key(text, sense)))
            .filter(|key| self.table.contains(key))
            .map(|key| (self.freq(&key).unwrap_or(-1), key))
            .max();

        best.map(|(_, key)| key)
    }
}

impl EmbeddingStore for Sense2VecStore {
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
        self.cfg.dims
    }
}

fn read_cfg(path: &Path) -> Result<StoreCfg> {
    let raw = std::fs::read_to_string(path.join(CFG_FILE))
        .map_err(|e| LanguageError::store_load(path, format!("cannot read {}: {}", CFG_FILE, e)))?;

    let cfg: StoreCfg = serde_json::from_str(&raw)
        .map_err(|e| LanguageError::store_load(path, format!("malformed {}: {}", CFG_FILE, e)))?;

    if cfg.version != FORMAT_VERSION {
        return Err(LanguageError::store_load(
            path,
            format!(
                "unsupported format version {} (expected {})",
                cfg.version, FORMAT_VERSION
            ),
        ));
    }

    if row_bytes(cfg.dims).is_none() {
        return Err(LanguageError::store_load(
            path,
            format!("dims {} is too large", cfg.dims),
        ));
    }

    Ok(cfg)
}

/// Byte width of one stored vector, `None` if it overflows
fn row_bytes(dims: usize) -> Option<usize> {
    dims.checked_mul(4)
}

fn read_vectors(path: &Path, cfg: &StoreCfg) -> Result<(VectorTable, HashMap<String, i64>)> {
    let db_path = path.join(VECTORS_FILE);
    if !db_path.is_file() {
        return Err(LanguageError::store_load(path, format!("missing {}", VECTORS_FILE)));
    }

    let load_err = |e: rusqlite::Error| LanguageError::store_load(path, e);

    let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(load_err)?;

    let mut stmt = conn
        .prepare("SELECT key, vector, freq FROM vectors ORDER BY idx")
        .map_err(load_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })
        .map_err(load_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(load_err)?;

    let expected_bytes = row_bytes(cfg.dims)
        .ok_or_else(|| LanguageError::store_load(path, format!("dims {} is too large", cfg.dims)))?;

    let mut table = VectorTable::new(cfg.dims);
    let mut freqs = HashMap::new();

    for (key, blob, freq) in rows {
        let vector = decode_vector(&blob, expected_bytes).ok_or_else(|| {
            LanguageError::store_load(
                path,
                format!(
                    "vector for {} is {} bytes, expected {}",
                    key,
                    blob.len(),
                    expected_bytes
                ),
            )
        })?;

        if let Some(freq) = freq {
            freqs.insert(key.clone(), freq);
        }
        table
            .push(key, vector)
            .map_err(|e| LanguageError::store_load(path, e))?;
    }

    Ok((table, freqs))
}

fn decode_vector(blob: &[u8], expected_bytes: usize) -> Option<Vec<f32>> {
    if blob.len() != expected_bytes {
        return None;
    }

    Some(
        blob.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

fn case_variants(word: &str, ignore_case: bool) -> Vec<String> {
    let mut variants = vec![word.to_string()];
    if ignore_case {
        for variant in [word.to_lowercase(), word.to_uppercase(), title_case(word)] {
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }
    variants
}

fn title_case(word: &str) -> String {
    word.split(' ')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
