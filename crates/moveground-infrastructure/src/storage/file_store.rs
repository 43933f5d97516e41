//! File-backed key/value store.

use super::atomic_json::AtomicJsonFile;
use async_trait::async_trait;
use moveground_core::error::{MovegroundError, Result};
use moveground_core::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// Persists all keys in a single JSON document.
///
/// Every operation reads the file fresh so that separate processes sharing
/// the file see each other's writes (last writer wins). Within a process the
/// mutex serializes read-modify-write cycles.
#[derive(Clone)]
pub struct FileKeyValueStore {
    file: Arc<Mutex<AtomicJsonFile<Entries>>>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(Mutex::new(AtomicJsonFile::new(path))),
        }
    }

    /// Location of the backing file.
    pub async fn path(&self) -> PathBuf {
        self.file.lock().await.path().to_path_buf()
    }

    /// Runs `f` against the file on the blocking pool.
    async fn with_file<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&AtomicJsonFile<Entries>) -> Result<R> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            let file = file.blocking_lock();
            f(&file)
        })
        .await
        .map_err(|e| MovegroundError::internal(format!("Failed to join storage task: {}", e)))?
    }
}

/// Reads the document. An unreadable document is treated as empty so the
/// next write replaces it.
fn load_entries(file: &AtomicJsonFile<Entries>) -> Result<Option<Entries>> {
    match file.load() {
        Err(MovegroundError::Serialization { message, .. }) => {
            tracing::warn!(
                target: "persistence",
                path = %file.path().display(),
                "Ignoring corrupt storage file: {}",
                message
            );
            Ok(Some(Entries::new()))
        }
        other => other,
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.with_file(move |file| {
            Ok(load_entries(file)?.and_then(|mut entries| entries.remove(&key)))
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry_key = key.to_string();
        let value = value.to_string();
        self.with_file(move |file| {
            let mut entries = load_entries(file)?.unwrap_or_default();
            entries.insert(entry_key, value);
            file.save(&entries)
        })
        .await?;
        tracing::debug!(target: "persistence", key, "Stored entry");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_file(move |file| {
            let Some(mut entries) = load_entries(file)? else {
                return Ok(());
            };
            entries.remove(&key);
            file.save(&entries)
        })
        .await
    }
}
