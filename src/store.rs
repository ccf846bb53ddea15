//! Best-score persistence.
//!
//! The best score is the only durable state. It lives in a string
//! key-value store under a single key, encoded as a decimal integer.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::engine::Score;

/// Key the best score is stored under.
pub const BEST_SCORE_KEY: &str = "2048-best-score";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key-value storage, the shape of the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore(HashMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk; the whole file is replaced on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet or does not
    /// hold a JSON object of strings. Other IO errors are returned.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("discarding unreadable store {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(&self.entries)?;
        // readers only ever see a complete file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Read the stored best score. Missing, unreadable or malformed values count as 0.
pub fn load_best<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Score {
    match store.get(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring malformed best score {raw:?} under {key:?}");
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            log::warn!("could not read best score: {e}");
            0
        }
    }
}

pub fn save_best<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, best: Score) -> Result<(), StoreError> {
    store.set(key, &best.to_string())
}
