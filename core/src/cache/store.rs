//! Injectable key-value storage behind the versioned cache.
//!
//! All durable state flows through [`StoragePort`] so the sync core never
//! touches the filesystem directly. Production uses [`FileStore`] (one file
//! per key under the platform data dir); tests use [`MemoryStore`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::error::CacheError;

/// Minimal key-value port: string keys, string payloads.
///
/// `set` has no error surface. Storage failures (disk full, permissions) are
/// external conditions the sync policy does not branch on; implementations
/// log and degrade, and a subsequent `get` simply misses.
pub trait StoragePort: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed store
// ─────────────────────────────────────────────────────────────────────────────

/// One file per key under a root directory, stable across restarts.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root).map_err(|source| CacheError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// `~/.local/share/bosswatch/cache/` or the platform equivalent.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bosswatch")
            .join("cache")
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Keys are internal constants, but sanitize anyway so a hostile key
        // cannot escape the cache directory.
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl StoragePort for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                debug!(key, %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.key_path(key);
        if let Err(err) = std::fs::write(&path, value) {
            warn!(key, path = ?path, %err, "cache write failed");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.key_path(key);
        if let Err(err) = std::fs::remove_file(&path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(key, path = ?path, %err, "cache remove failed");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local store, shared by clone. Test double for [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache")).unwrap();

        assert_eq!(store.get("snapshots"), None);
        store.set("snapshots", "{\"data\":[]}");
        assert_eq!(store.get("snapshots"), Some("{\"data\":[]}".to_string()));

        store.remove("snapshots");
        assert_eq!(store.get("snapshots"), None);
        // Removing an absent key is a no-op
        store.remove("snapshots");
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("../escape/attempt", "x");
        assert_eq!(store.get("../escape/attempt"), Some("x".to_string()));
        // Nothing was written outside the root
        assert!(!dir.path().parent().unwrap().join("escape").exists());
    }

    #[test]
    fn memory_store_shares_state_across_clones() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.set("k", "v");
        assert_eq!(clone.get("k"), Some("v".to_string()));

        clone.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
