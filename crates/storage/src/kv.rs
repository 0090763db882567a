use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by key-value adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Key-value port standing in for browser storage.
///
/// Values are opaque strings; stores JSON-encode their own payloads.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns `StorageError::Serialization` when the stored text is not valid JSON
/// for `T`, or any backend error from `get`.
pub async fn read_json<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = kv.get(key).await? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Encode a value as JSON and store it.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the backend write fails.
pub async fn write_json<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    kv.set(key, &raw).await
}

/// In-memory store for tests and session-scoped state.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|g| g.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every key, like clearing site data.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// The two storage scopes the client uses.
///
/// `local` survives restarts; `session` lives as long as the process.
#[derive(Clone)]
pub struct Storage {
    pub local: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(InMemoryKeyValueStore::new()),
            session: Arc::new(InMemoryKeyValueStore::new()),
        }
    }

    #[must_use]
    pub fn with_local(local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            local,
            session: Arc::new(InMemoryKeyValueStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let kv = InMemoryKeyValueStore::new();
        assert_eq!(kv.get("k").await.unwrap(), None);
        kv.set("k", "v").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));
        kv.remove("k").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);
        kv.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn read_json_reports_corrupt_values() {
        let kv = InMemoryKeyValueStore::new();
        kv.set("ids", "not-valid-json{{").await.unwrap();
        let result: Result<Option<Vec<u64>>, _> = read_json(&kv, "ids").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn write_json_then_read_json() {
        let kv = InMemoryKeyValueStore::new();
        write_json(&kv, "ids", &[1_u64, 2, 3]).await.unwrap();
        assert_eq!(kv.get("ids").await.unwrap().as_deref(), Some("[1,2,3]"));
        let ids: Option<Vec<u64>> = read_json(&kv, "ids").await.unwrap();
        assert_eq!(ids, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let kv = InMemoryKeyValueStore::new();
        let other = kv.clone();
        kv.set("a", "1").await.unwrap();
        assert_eq!(other.len(), 1);
        other.clear();
        assert!(kv.is_empty());
    }
}
