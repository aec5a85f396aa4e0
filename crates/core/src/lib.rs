//! Fittipaldi Core - Shared types library.
//!
//! This crate provides common types used across the storefront components:
//! - `cart` - Client-side shopping cart (store, persistence, view model)
//! - `cli` - Command-line front end over a file-backed cart slot
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
