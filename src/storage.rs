//! Expiring key/value persistence used to survive restarts.
//!
//! [`PersistentStore`] wraps a pluggable [`StorageBackend`] (a synchronous
//! string key/value substrate) and adds serde serialization plus optional
//! per-entry expiration. Expiration is checked only on read; there is no
//! background sweep. An expired or malformed entry reads as absent and the
//! underlying slot is purged on the spot.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::util::now_millis;

/// Logical keys for everything cinesea persists through the store.
pub mod keys {
    /// Signed-in mock user session.
    pub const USER: &str = "cinesea_user";
    /// Favorites ledger (full collection under one key).
    pub const FAVORITES: &str = "cinesea_favorites";
    /// Theme preference (`light` / `dark`).
    pub const THEME: &str = "cinesea_theme";
    /// Recent search history.
    pub const RECENT_SEARCHES: &str = "cinesea_recent_searches";
    /// Common prefix of all keys above, for namespace-wide clears.
    pub const PREFIX: &str = "cinesea_";
}

/// A write was rejected by the underlying substrate (quota, I/O failure,
/// storage disabled). Callers treat this as non-fatal and keep going with
/// their in-memory state.
#[derive(Debug, Clone)]
pub struct StorageError {
    /// Human-readable description of the rejected write.
    pub message: String,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "storage error: {}", self.message)
    }
}

impl std::error::Error for StorageError {}

/// Synchronous string key/value substrate.
///
/// Reads never fail (absence covers every read problem); writes may be
/// rejected. `snapshot_keys` exists so the store can clear a namespace
/// without the backend knowing about key conventions.
pub trait StorageBackend: Send + Sync {
    /// Raw value for `key`, if present.
    fn load(&self, key: &str) -> Option<String>;
    /// Write `value` under `key`, replacing any previous value.
    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Best-effort removal of `key`.
    fn remove(&self, key: &str);
    /// All keys currently present.
    fn snapshot_keys(&self) -> Vec<String>;
}

/// Serialization envelope stored for every entry.
#[derive(serde::Serialize, serde::Deserialize)]
struct StoredEntry<T> {
    value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

/// Typed get/set/remove with optional TTL over a [`StorageBackend`].
pub struct PersistentStore {
    backend: Box<dyn StorageBackend>,
}

impl PersistentStore {
    /// Wrap `backend`.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Read and deserialize `key`. Returns `None` for absent, expired, or
    /// malformed entries; the latter two purge the slot.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, now_millis())
    }

    pub(crate) fn get_at<T: DeserializeOwned>(&self, key: &str, now_ms: i64) -> Option<T> {
        let raw = self.backend.load(key)?;
        let entry: StoredEntry<T> = match serde_json::from_str(&raw) {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(key, error = %e, "purging malformed stored entry");
                self.backend.remove(key);
                return None;
            }
        };
        if let Some(exp) = entry.expires_at
            && now_ms > exp
        {
            tracing::debug!(key, "purging expired stored entry");
            self.backend.remove(key);
            return None;
        }
        Some(entry.value)
    }

    /// Serialize and write `value` under `key`. With a `ttl` the entry
    /// becomes unreadable once the TTL elapses from now.
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        self.set_at(key, value, ttl, now_millis())
    }

    pub(crate) fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        now_ms: i64,
    ) -> Result<(), StorageError> {
        let entry = StoredEntry {
            value,
            expires_at: ttl.map(|d| now_ms.saturating_add(d.as_millis() as i64)),
        };
        let raw = serde_json::to_string(&entry).map_err(|e| StorageError {
            message: format!("serialize {key}: {e}"),
        })?;
        if let Err(e) = self.backend.store(key, &raw) {
            tracing::warn!(key, error = %e, "storage write rejected");
            return Err(e);
        }
        Ok(())
    }

    /// Best-effort removal of `key`.
    pub fn remove(&self, key: &str) {
        self.backend.remove(key);
    }

    /// Best-effort removal of every key starting with `prefix`.
    pub fn clear_prefix(&self, prefix: &str) {
        for key in self.backend.snapshot_keys() {
            if key.starts_with(prefix) {
                self.backend.remove(&key);
            }
        }
    }
}

/// In-memory backend for tests and for degraded (storage-less) operation.
/// An optional capacity bounds the number of distinct keys, rejecting
/// writes of new keys beyond it the way a quota-bounded substrate would.
#[derive(Default)]
pub struct MemoryBackend {
    map: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryBackend {
    /// Unbounded in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory backend that refuses to grow past `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Option<String> {
        self.guard().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.guard();
        if let Some(cap) = self.capacity
            && !map.contains_key(key)
            && map.len() >= cap
        {
            return Err(StorageError {
                message: format!("quota exceeded ({cap} keys)"),
            });
        }
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.guard().remove(key);
    }

    fn snapshot_keys(&self) -> Vec<String> {
        self.guard().keys().cloned().collect()
    }
}

/// Durable backend keeping the whole keyspace in one JSON file, written
/// through on every mutation. A missing or unreadable file opens as empty.
pub struct FileBackend {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Open (or create on first write) the backing file at `path`.
    pub fn open(path: PathBuf) -> Self {
        let map = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "store file malformed; starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            map: Mutex::new(map),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(map).map_err(|e| StorageError {
            message: format!("serialize store file: {e}"),
        })?;
        std::fs::write(&self.path, raw).map_err(|e| StorageError {
            message: format!("write {}: {e}", self.path.display()),
        })
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> Option<String> {
        self.guard().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.guard();
        let previous = map.insert(key.to_owned(), value.to_owned());
        match self.flush(&map) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Keep the in-memory view consistent with what is on disk.
                match previous {
                    Some(p) => {
                        map.insert(key.to_owned(), p);
                    }
                    None => {
                        map.remove(key);
                    }
                }
                Err(e)
            }
        }
    }

    fn remove(&self, key: &str) {
        let mut map = self.guard();
        if map.remove(key).is_some()
            && let Err(e) = self.flush(&map)
        {
            tracing::warn!(key, error = %e, "failed to persist removal");
        }
    }

    fn snapshot_keys(&self) -> Vec<String> {
        self.guard().keys().cloned().collect()
    }
}
