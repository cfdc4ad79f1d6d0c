use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Error;

/// String key/value storage the gate and tracker read from.
///
/// Stands in for cookies, `localStorage` or `sessionStorage`. Methods take
/// `&self`; implementations hold their own interior mutability.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` means the key is not set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageRead`] if the backing storage is unavailable
    /// or the stored value is malformed.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the backing storage rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        (**self).remove(key)
    }
}

/// In-process store. Lives as long as the value does, like a tab's
/// `sessionStorage`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, builder style.
    #[must_use]
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        self
    }

    /// Drop every entry, as when the browsing session ends.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| Error::StorageRead(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn remove_and_clear() {
        let store = MemoryStore::new().with_entry("a", "1").with_entry("b", "2");
        store.remove("a").unwrap();
        store.remove("missing").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        store.clear();
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn works_through_references_and_arcs() {
        let store = Arc::new(MemoryStore::new());
        let by_ref: &dyn KeyValueStore = &*store;
        by_ref.set("k", "v").unwrap();
        assert_eq!(store.clone().get("k").unwrap().as_deref(), Some("v"));
    }
}
