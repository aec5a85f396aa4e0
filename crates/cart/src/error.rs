//! Cart error type.
//!
//! Validation failures on cart operations are returned to the caller as a
//! `CartError` and leave the cart unchanged. Storage failures never surface
//! here: the store absorbs them and keeps working in memory.

use fittipaldi_core::{ProductId, QuantityError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is not a positive count.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Merging into an existing line would exceed the maximum quantity.
    #[error("Quantity overflow for product {0}")]
    QuantityOverflow(ProductId),

    /// A line or the cart total does not fit in a `Decimal`.
    #[error("Cart total is too large")]
    TotalOverflow,

    /// Product has no identifier to merge on.
    #[error("Product ID cannot be empty")]
    EmptyProductId,

    /// Product has a negative unit price.
    #[error("Negative price for product {id}: {price}")]
    NegativePrice {
        /// Offending product.
        id: ProductId,
        /// The rejected price.
        price: Decimal,
    },

    /// Checkout has no backing order system.
    #[error("Checkout is not available")]
    CheckoutUnavailable,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
