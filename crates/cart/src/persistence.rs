//! Versioned cart document in a namespaced storage slot.
//!
//! # Document
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": "2026-10-18T12:00:00Z",
//!   "items": [
//!     { "id": "elite-pro", "name": "Elite Pro", "description": "Corte negativo",
//!       "image": "/img/elite.webp", "price": "129", "quantity": 2 }
//!   ],
//!   "total": "258"
//! }
//! ```
//!
//! Decimals are stored as strings so they come back exactly as saved.
//! Loading reads `version` before anything else, so a future shape change
//! is discarded instead of failing to deserialize.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CartItem, CartState, compute_total};
use crate::storage::{KeyValueStorage, StorageError};

/// Storage key used by the storefront since launch.
pub const DEFAULT_STORAGE_KEY: &str = "fittipald1-cart";

/// Current document version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that can occur when saving the cart.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons a persisted cart could not be restored.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The slot could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The slot does not hold a JSON cart document.
    #[error("Malformed cart document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document was written by an incompatible version.
    #[error("Unsupported cart document version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The document parsed but breaks a cart invariant.
    #[error("Invalid cart document: {0}")]
    Invalid(String),
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Serialize)]
struct PersistedCartRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [CartItem],
    #[serde(with = "rust_decimal::serde::str")]
    total: Decimal,
}

#[derive(Deserialize)]
struct PersistedCart {
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::str")]
    total: Decimal,
}

/// Saves and restores a [`CartState`] under one storage key.
pub struct CartPersistence {
    storage: Box<dyn KeyValueStorage>,
    key: String,
}

impl std::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CartPersistence {
    /// Persistence under [`DEFAULT_STORAGE_KEY`].
    #[must_use]
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Persistence under a custom key.
    #[must_use]
    pub fn with_key(storage: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize `state` into the slot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if serialization or the write fails.
    pub fn save(&self, state: &CartState) -> Result<(), PersistenceError> {
        let document = PersistedCartRef {
            version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            items: state.items(),
            total: state.total(),
        };
        let json = serde_json::to_string(&document)?;
        self.storage.set(&self.key, &json)?;
        tracing::trace!(key = %self.key, lines = state.line_count(), "Saved cart");
        Ok(())
    }

    /// Read the slot and rebuild the cart.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `RestoreError` if the slot cannot be read, does not parse,
    /// has another version, or breaks a cart invariant.
    pub fn restore(&self) -> Result<Option<CartState>, RestoreError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };

        let probe: VersionProbe = serde_json::from_str(&raw)?;
        if probe.version != SCHEMA_VERSION {
            return Err(RestoreError::UnsupportedVersion {
                found: probe.version,
                expected: SCHEMA_VERSION,
            });
        }

        let document: PersistedCart = serde_json::from_str(&raw)?;
        let state = validate(document)?;
        Ok(Some(state))
    }

    /// Restore the cart, falling back to an empty one on any problem.
    ///
    /// Unreadable storage is left alone; a document that cannot be used is
    /// removed so it is not tried again on the next start.
    #[must_use]
    pub fn load(&self) -> CartState {
        match self.restore() {
            Ok(Some(state)) => {
                tracing::debug!(
                    key = %self.key,
                    lines = state.line_count(),
                    total = %state.total(),
                    "Restored cart"
                );
                state
            }
            Ok(None) => CartState::new(),
            Err(RestoreError::Storage(e)) => {
                tracing::warn!(key = %self.key, error = %e, "Cart storage unreadable, starting empty");
                CartState::new()
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding persisted cart");
                if let Err(e) = self.discard() {
                    tracing::warn!(key = %self.key, error = %e, "Failed to discard persisted cart");
                }
                CartState::new()
            }
        }
    }

    /// Remove the slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn discard(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }
}

/// Check a parsed document against the cart invariants.
fn validate(document: PersistedCart) -> Result<CartState, RestoreError> {
    {
        let mut seen = HashSet::with_capacity(document.items.len());
        for item in &document.items {
            if item.id.is_empty() {
                return Err(RestoreError::Invalid("item with empty id".to_string()));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(RestoreError::Invalid(format!("duplicate item id {}", item.id)));
            }
            if item.price.is_sign_negative() && !item.price.is_zero() {
                return Err(RestoreError::Invalid(format!(
                    "negative price for item {}",
                    item.id
                )));
            }
        }
    }

    let computed = compute_total(&document.items)
        .ok_or_else(|| RestoreError::Invalid("item totals overflow".to_string()))?;
    if computed != document.total {
        return Err(RestoreError::Invalid(format!(
            "stored total {} does not match items ({computed})",
            document.total
        )));
    }

    if let Some(saved_at) = document.saved_at {
        tracing::trace!(%saved_at, "Validated cart document");
    }

    CartState::from_items(document.items).map_err(|e| RestoreError::Invalid(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Product;
    use crate::storage::MemoryStorage;
    use crate::transitions::add_item;
    use rust_decimal_macros::dec;

    fn persistence(storage: &MemoryStorage) -> CartPersistence {
        CartPersistence::new(Box::new(storage.clone()))
    }

    fn sample_state() -> CartState {
        let state = add_item(
            &CartState::new(),
            Product::new("elite-pro", "Elite Pro", dec!(129.50))
                .with_description("Corte negativo, palma 4mm")
                .with_image("/assets/glove1.webp"),
            2,
        )
        .unwrap();
        add_item(&state, Product::new("classic", "Classic", dec!(89)), 1).unwrap()
    }

    #[test]
    fn test_save_then_restore_round_trips() {
        let storage = MemoryStorage::new();
        let persistence = persistence(&storage);
        let state = sample_state();

        persistence.save(&state).unwrap();
        let restored = persistence.restore().unwrap().unwrap();

        assert_eq!(restored, state);
        assert_eq!(restored.items(), state.items());
        assert_eq!(restored.total(), dec!(348.00));
    }

    #[test]
    fn test_document_shape() {
        let storage = MemoryStorage::new();
        persistence(&storage).save(&sample_state()).unwrap();

        let raw = storage.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["total"], "348.00");
        assert_eq!(value["items"][0]["id"], "elite-pro");
        assert_eq!(value["items"][0]["price"], "129.50");
        assert_eq!(value["items"][0]["quantity"], 2);
        assert!(value["items"][1].get("image").is_none());
        assert!(value["saved_at"].is_string());
    }

    #[test]
    fn test_restore_missing_slot() {
        let storage = MemoryStorage::new();
        assert!(persistence(&storage).restore().unwrap().is_none());
        assert_eq!(persistence(&storage).load(), CartState::new());
    }

    #[test]
    fn test_restore_rejects_other_version() {
        let storage = MemoryStorage::new();
        storage
            .set(DEFAULT_STORAGE_KEY, r#"{"version":2,"lines":[]}"#)
            .unwrap();
        assert!(matches!(
            persistence(&storage).restore(),
            Err(RestoreError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn test_restore_rejects_legacy_unversioned_document() {
        // Shape written by the JavaScript storefront's persist middleware
        let storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"state":{"items":[],"total":0},"version":0}"#,
            )
            .unwrap();
        assert!(matches!(
            persistence(&storage).restore(),
            Err(RestoreError::UnsupportedVersion { found: 0, .. })
        ));
    }

    #[test]
    fn test_restore_rejects_schema_violations() {
        let cases = [
            // zero quantity
            r#"{"version":1,"items":[{"id":"a","name":"A","price":"1","quantity":0}],"total":"0"}"#,
            // duplicate ids
            r#"{"version":1,"items":[{"id":"a","name":"A","price":"1","quantity":1},{"id":"a","name":"A","price":"1","quantity":1}],"total":"2"}"#,
            // negative price
            r#"{"version":1,"items":[{"id":"a","name":"A","price":"-1","quantity":1}],"total":"-1"}"#,
            // total drift
            r#"{"version":1,"items":[{"id":"a","name":"A","price":"1","quantity":2}],"total":"3"}"#,
            // empty id
            r#"{"version":1,"items":[{"id":"","name":"A","price":"1","quantity":1}],"total":"1"}"#,
            // not json
            "not json at all",
        ];

        for raw in cases {
            let storage = MemoryStorage::new();
            storage.set(DEFAULT_STORAGE_KEY, raw).unwrap();
            assert!(
                persistence(&storage).restore().is_err(),
                "expected restore failure for {raw}"
            );
        }
    }

    #[test]
    fn test_load_discards_corrupt_document() {
        let storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{corrupt").unwrap();

        assert_eq!(persistence(&storage).load(), CartState::new());
        assert!(storage.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_discards_document_with_overflowing_total() {
        let storage = MemoryStorage::new();
        let doc = serde_json::json!({
            "version": 1,
            "items": [{ "id": "a", "name": "A", "price": Decimal::MAX.to_string(), "quantity": 2 }],
            "total": "0"
        });
        storage.set(DEFAULT_STORAGE_KEY, &doc.to_string()).unwrap();

        assert!(matches!(
            persistence(&storage).restore(),
            Err(RestoreError::Invalid(_))
        ));
        assert_eq!(persistence(&storage).load(), CartState::new());
        assert!(storage.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_keeps_slot_when_storage_unreadable() {
        let storage = MemoryStorage::new();
        persistence(&storage).save(&sample_state()).unwrap();
        storage.set_enabled(false);

        assert_eq!(persistence(&storage).load(), CartState::new());

        storage.set_enabled(true);
        assert_eq!(persistence(&storage).load(), sample_state());
    }

    #[test]
    fn test_custom_key() {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::with_key(Box::new(storage.clone()), "preview-cart");
        persistence.save(&sample_state()).unwrap();

        assert_eq!(persistence.key(), "preview-cart");
        assert!(storage.get("preview-cart").unwrap().is_some());
        assert!(storage.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }
}
