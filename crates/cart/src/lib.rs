//! Fittipaldi Cart library.
//!
//! The cart is the only stateful piece of the storefront. It is split into:
//!
//! - [`model`] - `Product`, `CartItem` and `CartState` (items plus derived total)
//! - [`transitions`] - pure `state -> state` functions and the `CartAction` reducer
//! - [`store`] - `CartStore`, which applies transitions, persists and notifies
//! - [`persistence`] - the versioned document kept in a namespaced storage slot
//! - [`storage`] - key-value backends (in-memory, file)
//! - [`events`] - cart events and observers (analytics forwarding)
//! - [`view`] - display model for the cart panel
//! - [`config`] - environment configuration
//!
//! # Example
//!
//! ```
//! use fittipaldi_cart::{CartPersistence, CartStore, MemoryStorage, Product};
//! use rust_decimal::Decimal;
//!
//! let persistence = CartPersistence::new(Box::new(MemoryStorage::new()));
//! let mut store = CartStore::open(persistence);
//!
//! let glove = Product::new("elite-pro", "Elite Pro", Decimal::from(10));
//! store.add_item(glove.clone(), 2).unwrap();
//! store.add_item(glove, 3).unwrap();
//!
//! assert_eq!(store.state().line_count(), 1);
//! assert_eq!(store.state().total(), Decimal::from(50));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod transitions;
pub mod view;

pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Result};
pub use events::{CartEvent, CartObserver, TracingObserver};
pub use model::{CartItem, CartState, Product};
pub use persistence::{CartPersistence, PersistenceError, RestoreError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::CartStore;
pub use transitions::{CartAction, Transition};
pub use view::{CartItemView, CartView};
