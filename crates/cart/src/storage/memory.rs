use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{KeyValueStorage, StorageError};

/// In-process storage.
///
/// Clones share the same map, so a test can hand one clone to a store and
/// keep another to inspect or corrupt the slot. An optional byte quota
/// (keys plus values) mimics the browser's `localStorage` limit, and the
/// backend can be switched off entirely to model disabled storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl Inner {
    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl MemoryStorage {
    /// Creates a new, empty, unlimited storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage that rejects writes beyond `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.inner.borrow_mut().quota_bytes = Some(bytes);
        storage
    }

    /// Enable or disable the backend. Disabled storage fails every call.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().disabled = !enabled;
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    fn check_enabled(inner: &Inner) -> Result<(), StorageError> {
        if inner.disabled {
            return Err(StorageError::Unavailable("storage is disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        Self::check_enabled(&inner)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        Self::check_enabled(&inner)?;

        if let Some(quota) = inner.quota_bytes {
            let needed = inner.used_bytes_excluding(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        Self::check_enabled(&inner)?;
        inner.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get("cart").unwrap().is_none());

        storage.set("cart", "{}").unwrap();
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("{}"));
        assert_eq!(storage.len(), 1);

        storage.remove("cart").unwrap();
        storage.remove("cart").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.set("k", "v").unwrap();
        assert_eq!(handle.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_quota_exceeded() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("k", "12345").unwrap();
        // Overwriting the same key only counts the new value
        storage.set("k", "123456789").unwrap();
        assert!(matches!(
            storage.set("k", "1234567890"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("123456789"));
    }

    #[test]
    fn test_disabled() {
        let storage = MemoryStorage::new();
        storage.set_enabled(false);
        assert!(matches!(storage.get("k"), Err(StorageError::Unavailable(_))));
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Unavailable(_))));

        storage.set_enabled(true);
        storage.set("k", "v").unwrap();
    }
}
