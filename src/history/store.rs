//! History persistence.
//!
//! The persistence medium is a key-value slot holding one JSON blob. The
//! whole document is overwritten on every save.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::history::document::PersistedDocument;

/// Errors from the persistence slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The slot could not be read or written.
    #[error("storage unavailable for `{key}`: {source}")]
    Unavailable {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The slot holds something that is not a history document.
    #[error("stored document `{key}` is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named key-value blob store.
pub trait BlobStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<directory>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-process slots.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves the history document in one slot of a `BlobStore`.
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn BlobStore>,
    key: String,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// A file-backed store rooted at `directory`.
    pub fn on_disk(directory: &Path, key: impl Into<String>) -> Self {
        Self::new(Arc::new(FileStore::new(directory)), key)
    }

    pub fn in_memory(key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the document, applying retention and window truncation.
    ///
    /// An empty slot yields `Ok(None)`.
    pub fn load(
        &self,
        now_ms: u64,
        retention_ms: u64,
        window_size: usize,
    ) -> Result<Option<PersistedDocument>, StorageError> {
        let Some(text) = self.backend.get(&self.key).map_err(|source| StorageError::Unavailable {
            key: self.key.clone(),
            source,
        })?
        else {
            return Ok(None);
        };

        let doc = PersistedDocument::from_json(&text, now_ms, retention_ms, window_size).map_err(
            |source| StorageError::Malformed {
                key: self.key.clone(),
                source,
            },
        )?;

        tracing::info!(
            key = %self.key,
            rtt_points = doc.rtt_history.len(),
            download_points = doc.download_history.len(),
            probe_results = doc.last_probe_results.len(),
            "Loaded history"
        );
        Ok(Some(doc))
    }

    /// Overwrite the slot with `doc`.
    pub fn save(&self, doc: &PersistedDocument) -> Result<(), StorageError> {
        let text = doc.to_json()?;
        self.backend
            .set(&self.key, &text)
            .map_err(|source| StorageError::Unavailable {
                key: self.key.clone(),
                source,
            })?;
        tracing::trace!(key = %self.key, bytes = text.len(), "Saved history");
        Ok(())
    }
}
