//! Key-value preference storage.
//!
//! Values are JSON documents under opaque string keys. Reads are total: a
//! missing key, an empty or corrupt value, or a backend failure all yield the
//! caller's fallback. Writes are best effort and never surface errors.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Storage keys. Values are JSON.
pub mod keys {
    pub const MOOD_LOGS: &str = "meditation.moodLogs";
    pub const MIXER: &str = "meditation.mixer";
    pub const STREAK: &str = "meditation.streak";
    pub const INTENTION: &str = "meditation.intention";
    pub const BREATH_PRESETS: &str = "breath-presets";
    pub const BREATH_SETTINGS: &str = "breath-settings";
}

/// Raw string storage backend.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON helpers on top of any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and decode `key`, or return `fallback`.
    fn read_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.get_raw(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return fallback,
            Err(e) => {
                tracing::warn!(key, error = %e, "preference store unavailable, using default");
                return fallback;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored preference is corrupt, using default");
                fallback
            }
        }
    }

    /// Encode and store `value`. Failures are logged and swallowed.
    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to encode preference");
                return;
            }
        };
        if let Err(e) = self.set_raw(key, &json) {
            tracing::warn!(key, error = %e, "failed to persist preference");
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.remove(key) {
            tracing::warn!(key, error = %e, "failed to delete preference");
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store, used by tests and when no data directory is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Backend that always fails, standing in for storage the platform denies.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get_raw(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }

    fn set_raw(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_yields_fallback() {
        let store = MemoryStore::new();
        assert_eq!(store.read_or("nope", 7u32), 7);
    }

    #[test]
    fn corrupt_json_yields_fallback() {
        let store = MemoryStore::new();
        store.set_raw("k", "{not json").unwrap();
        assert_eq!(store.read_or("k", vec![1u8]), vec![1u8]);
    }

    #[test]
    fn empty_value_yields_fallback() {
        let store = MemoryStore::new();
        store.set_raw("k", "").unwrap();
        assert_eq!(store.read_or("k", String::from("x")), "x");
    }

    #[test]
    fn unavailable_backend_yields_fallback_and_write_is_silent() {
        let store = UnavailableStore;
        store.write("k", &5u32);
        assert_eq!(store.read_or("k", 3u32), 3);
        store.delete("k");
    }

    #[test]
    fn write_then_read() {
        let store = MemoryStore::new();
        store.write("k", &vec!["a", "b"]);
        let back: Vec<String> = store.read_or("k", Vec::new());
        assert_eq!(back, vec!["a", "b"]);
        store.delete("k");
        assert!(store.is_empty());
    }
}
