//! Durable key-value slots for cart persistence.
//!
//! The browser build keeps the cart in `localStorage`; this trait is the
//! same shape (string keys, string values) so backends stay interchangeable.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - in-process map with an optional byte quota
//! - [`FileStorage`] - one file per key in a data directory

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors that can occur when reading or writing a storage slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing would exceed the backend's capacity.
    #[error("Storage quota exceeded writing {key}")]
    QuotaExceeded { key: String },

    /// The backend is disabled or cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A string key-value store.
///
/// Methods take `&self`; backends that mutate use interior mutability so a
/// handle can be shared between the store and whoever inspects the slot.
pub trait KeyValueStorage {
    /// Read the value at `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected or fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
