//! Display model for the cart panel.
//!
//! The panel never formats money itself; it renders the strings built here.

use fittipaldi_core::{CurrencyCode, Price};
use serde::Serialize;

use crate::model::{CartItem, CartState};

/// Cart row display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub quantity: u32,
    /// Formatted unit price.
    pub price: String,
    /// Formatted `price * quantity`; empty if it does not fit.
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    /// Units across all rows.
    pub item_count: u64,
    /// Distinct rows, shown in the panel header.
    pub line_count: usize,
    pub currency: &'static str,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self::from_state(&CartState::new(), currency)
    }

    /// Build the view for `state`.
    #[must_use]
    pub fn from_state(state: &CartState, currency: CurrencyCode) -> Self {
        Self {
            items: state
                .items()
                .iter()
                .map(|item| CartItemView::from_item(item, currency))
                .collect(),
            total: Price::new(state.total(), currency).display(),
            item_count: state.item_count(),
            line_count: state.line_count(),
            currency: currency.code(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CartItemView {
    #[must_use]
    pub fn from_item(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            quantity: item.quantity.get(),
            price: Price::new(item.price, currency).display(),
            line_price: item
                .line_total()
                .map(|line| Price::new(line, currency).display())
                .unwrap_or_default(),
        }
    }
}
