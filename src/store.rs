//! Read-only key-value storage.
//!
//! The history view only ever performs a single lookup by key, so the store
//! abstraction is one method wide. `FileStore` keeps each key in its own JSON
//! file under a directory; `MemoryStore` is the in-process substitute.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HistoryError, Result};

/// A read-only key-value store holding serialized payloads.
///
/// Payloads are raw bytes; decoding (including UTF-8 validation) is the
/// reader's concern.
pub trait KeyValueStore {
    /// Return the payload stored under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Directory-backed store: key `k` lives in `<dir>/<k>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(payload) => {
                debug!(path = %path.display(), bytes = payload.len(), "read store entry");
                Ok(Some(payload))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "store entry absent");
                Ok(None)
            }
            Err(source) => Err(HistoryError::StoreIo { path, source }),
        }
    }
}

/// In-memory store, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(key.into(), payload.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }
}

/// Convert a key to a safe file stem: lowercase alphanumerics separated by
/// single underscores.
pub fn sanitize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
