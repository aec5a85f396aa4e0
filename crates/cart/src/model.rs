//! Cart data model.
//!
//! `CartState` keeps its fields private so the total can only ever be the
//! one computed from the items it sits next to.

use fittipaldi_core::{ProductId, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CartError, Result};

/// A catalog product as handed to the cart by a product page.
///
/// Only `id` (merge key) and `price` (totals) mean anything to the cart;
/// the rest is carried through for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price in the store's base currency.
    pub price: Decimal,
}

impl Product {
    /// Create a product with no description or image.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            image: None,
            price,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Check the fields the cart depends on.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyProductId`] or [`CartError::NegativePrice`].
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CartError::EmptyProductId);
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(CartError::NegativePrice {
                id: self.id.clone(),
                price: self.price,
            });
        }
        Ok(())
    }
}

/// One product row in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub quantity: Quantity,
}

impl CartItem {
    /// Build a row from a product.
    #[must_use]
    pub fn from_product(product: Product, quantity: Quantity) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            image: product.image,
            price: product.price,
            quantity,
        }
    }

    /// `price * quantity`, or `None` if it does not fit in a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity.as_decimal())
    }
}

/// Cart contents and their derived total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartState {
    items: Vec<CartItem>,
    total: Decimal,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Build a state from rows, computing the total.
    ///
    /// Callers are responsible for id uniqueness; transitions and the
    /// persistence validator both guarantee it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TotalOverflow`] if a line or the total does not
    /// fit in a `Decimal`.
    pub(crate) fn from_items(items: Vec<CartItem>) -> Result<Self> {
        let total = compute_total(&items).ok_or(CartError::TotalOverflow)?;
        Ok(Self { items, total })
    }

    /// The rows for which `keep` returns `true`, in order.
    ///
    /// Prices are never negative, so the kept rows sum to at most the
    /// current total and the saturating fold is exact.
    #[must_use]
    pub(crate) fn retain(&self, keep: impl Fn(&CartItem) -> bool) -> Self {
        let items: Vec<CartItem> = self.items.iter().filter(|item| keep(item)).cloned().collect();
        let total = items.iter().fold(Decimal::ZERO, |acc, item| {
            acc.saturating_add(item.price.saturating_mul(item.quantity.as_decimal()))
        });
        Self { items, total }
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of `price * quantity` over all rows.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Look up a row by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether a row exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct rows.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Number of units across all rows.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

/// Fold `price * quantity` over `items`; `None` on overflow.
#[must_use]
pub fn compute_total(items: &[CartItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}
