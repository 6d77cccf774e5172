//! Key-value persistence with hydration signaling.
//!
//! [`Store`] is the capability the core needs from the platform: load and
//! save opaque strings under a key. [`PersistentStore`] layers JSON encoding
//! on top and makes every failure non-fatal: reads fall back to a default,
//! writes are logged and dropped.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Raw string storage keyed by name.
pub trait Store {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store. Writes can be made to fail to simulate a full quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a raw value, bypassing encoding.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    /// Make subsequent `save`/`remove` calls fail.
    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON-encoding wrapper that never propagates storage failures.
#[derive(Debug)]
pub struct PersistentStore<S> {
    inner: S,
    hydrated: bool,
}

impl<S: Store> PersistentStore<S> {
    /// Wrap a backend. Not hydrated until [`hydrate`](Self::hydrate) runs.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            hydrated: false,
        }
    }

    /// `false` until the initial read has completed. Values read before then
    /// are defaults, not confirmed state.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Perform the initial read of `key` and mark the store hydrated.
    pub fn hydrate<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        let value = self.read(key, default);
        self.hydrated = true;
        tracing::debug!(key, "store hydrated");
        value
    }

    /// Decode the value under `key`, or `default` if absent or corrupt.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.inner.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read from store, using default");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is malformed, using default");
                default
            }
        }
    }

    /// Encode and save `value`. Returns whether the write reached the backend.
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize value, not persisted");
                return false;
            }
        };
        match self.inner.save(key, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to persist value, kept in memory only");
                false
            }
        }
    }

    /// Drop `key` from the backend. Failures are logged.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.inner.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to remove value");
                false
            }
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_default_when_absent() {
        let store = PersistentStore::new(MemoryStore::new());
        let v: Vec<u32> = store.read("missing", vec![7]);
        assert_eq!(v, vec![7]);
    }

    #[test]
    fn read_returns_default_when_corrupt() {
        let store = PersistentStore::new(MemoryStore::new().with_entry("k", "{not json"));
        let v: Vec<u32> = store.read("k", Vec::new());
        assert!(v.is_empty());
    }

    #[test]
    fn read_returns_default_on_wrong_shape() {
        let store = PersistentStore::new(MemoryStore::new().with_entry("k", r#"{"a":1}"#));
        let v: Vec<u32> = store.read("k", Vec::new());
        assert!(v.is_empty());
    }

    #[test]
    fn write_then_read() {
        let mut store = PersistentStore::new(MemoryStore::new());
        assert!(store.write("k", &vec![1u32, 2, 3]));
        let v: Vec<u32> = store.read("k", Vec::new());
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn write_failure_is_swallowed() {
        let mut backend = MemoryStore::new();
        backend.set_reject_writes(true);
        let mut store = PersistentStore::new(backend);
        assert!(!store.write("k", &vec![1u32]));
        assert!(store.inner().raw("k").is_none());
    }

    #[test]
    fn hydrate_sets_flag() {
        let mut store = PersistentStore::new(MemoryStore::new().with_entry("k", "[4]"));
        assert!(!store.is_hydrated());
        let v: Vec<u32> = store.hydrate("k", Vec::new());
        assert!(store.is_hydrated());
        assert_eq!(v, vec![4]);
    }
}
