//! Integration tests for the Fittipaldi cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fittipaldi-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - store operations and total consistency
//! - `cart_persistence` - restore through file storage, corrupt and unavailable slots
//!
//! Shared fixtures live here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use fittipaldi_cart::{CartAction, CartPersistence, CartStore, FileStorage};
use rand::Rng;
use rust_decimal::Decimal;
use tempfile::TempDir;

pub use fittipaldi_cart::Product;

/// A small glove catalog with distinct prices, including a fractional one.
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        Product::new("elite-pro", "Elite Pro", Decimal::new(129_000, 0))
            .with_description("Latex aleman 4mm")
            .with_image("/assets/gloves/elite-pro.webp"),
        Product::new("junior", "Junior", Decimal::new(45_500, 0)),
        Product::new("cinta", "Cinta de muñeca", Decimal::new(1_999, 2)),
        Product::new("bolso", "Bolso", Decimal::new(0, 0)),
    ]
}

/// A random action over `products`, weighted towards adds.
///
/// Quantities stay small and products come from `products`, so every
/// action is accepted by the store.
///
/// # Panics
///
/// Panics if `products` is empty.
pub fn random_action(rng: &mut impl Rng, products: &[Product]) -> CartAction {
    #[allow(clippy::indexing_slicing)]
    let product = &products[rng.random_range(0..products.len())];
    match rng.random_range(0..10) {
        0..=4 => CartAction::Add {
            product: product.clone(),
            quantity: rng.random_range(1..=5),
        },
        5 | 6 => CartAction::UpdateQuantity {
            id: product.id.clone(),
            quantity: rng.random_range(-2..=8),
        },
        7 | 8 => CartAction::Remove {
            id: product.id.clone(),
        },
        _ => CartAction::Clear,
    }
}

/// A file-backed cart slot in a temporary directory.
///
/// Each call to [`FileCart::open`] builds a new store over the same
/// directory, which is how a page reload looks to the cart.
pub struct FileCart {
    dir: TempDir,
}

impl FileCart {
    /// Create an empty temporary slot.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Storage rooted at the temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory is not usable.
    #[must_use]
    pub fn storage(&self) -> FileStorage {
        FileStorage::open(self.dir.path()).expect("Failed to open file storage")
    }

    /// Open a store over the slot, restoring whatever it holds.
    #[must_use]
    pub fn open(&self) -> CartStore {
        CartStore::open(CartPersistence::new(Box::new(self.storage())))
    }

    /// Path of the default cart slot file.
    #[must_use]
    pub fn slot_path(&self) -> std::path::PathBuf {
        self.storage().path_for(fittipaldi_cart::persistence::DEFAULT_STORAGE_KEY)
    }
}

impl Default for FileCart {
    fn default() -> Self {
        Self::new()
    }
}
