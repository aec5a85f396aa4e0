//! Cart events and observers.
//!
//! The storefront forwards cart activity to its tag manager and pixel. Here
//! that becomes a `CartObserver` notified after each change; observers are
//! fire-and-forget and cannot fail or veto a change.

use fittipaldi_core::{CurrencyCode, ProductId, Quantity};
use rust_decimal::Decimal;

use crate::model::CartState;

/// Something that changed in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// Units were added, either as a new row or merged into an existing one.
    ItemAdded {
        id: ProductId,
        name: String,
        /// Units added by this operation, not the row's new quantity.
        quantity: Quantity,
        unit_price: Decimal,
    },
    /// A row was removed.
    ItemRemoved { id: ProductId },
    /// A row's quantity was set to a new value.
    QuantityChanged { id: ProductId, quantity: Quantity },
    /// A non-empty cart was emptied.
    Cleared,
}

impl CartEvent {
    /// Event name as reported to analytics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ItemAdded { .. } => "add_to_cart",
            Self::ItemRemoved { .. } => "remove_from_cart",
            Self::QuantityChanged { .. } => "update_cart_quantity",
            Self::Cleared => "clear_cart",
        }
    }

    /// Product the event concerns, if any.
    #[must_use]
    pub const fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::ItemAdded { id, .. }
            | Self::ItemRemoved { id }
            | Self::QuantityChanged { id, .. } => Some(id),
            Self::Cleared => None,
        }
    }
}

/// Receives cart events after the new state is committed.
pub trait CartObserver {
    /// Called once per change with the state after the change.
    fn on_event(&self, event: &CartEvent, state: &CartState);
}

impl<F> CartObserver for F
where
    F: Fn(&CartEvent, &CartState),
{
    fn on_event(&self, event: &CartEvent, state: &CartState) {
        self(event, state);
    }
}

/// Forwards cart events as structured `tracing` events.
///
/// Events are emitted under the `fittipaldi_cart::analytics` target so a
/// subscriber can route them to an analytics sink separately from logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    currency: CurrencyCode,
}

impl TracingObserver {
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self { currency }
    }
}

impl CartObserver for TracingObserver {
    fn on_event(&self, event: &CartEvent, state: &CartState) {
        let currency = self.currency.code();
        match event {
            CartEvent::ItemAdded {
                id,
                name,
                quantity,
                unit_price,
            } => {
                let value = unit_price.checked_mul(quantity.as_decimal());
                tracing::info!(
                    target: "fittipaldi_cart::analytics",
                    event = event.name(),
                    item_id = %id,
                    item_name = %name,
                    quantity = quantity.get(),
                    price = %unit_price,
                    value = value.map(tracing::field::display),
                    currency,
                    cart_total = %state.total(),
                );
            }
            CartEvent::ItemRemoved { id } => {
                tracing::info!(
                    target: "fittipaldi_cart::analytics",
                    event = event.name(),
                    item_id = %id,
                    currency,
                    cart_total = %state.total(),
                );
            }
            CartEvent::QuantityChanged { id, quantity } => {
                tracing::info!(
                    target: "fittipaldi_cart::analytics",
                    event = event.name(),
                    item_id = %id,
                    quantity = quantity.get(),
                    currency,
                    cart_total = %state.total(),
                );
            }
            CartEvent::Cleared => {
                tracing::info!(
                    target: "fittipaldi_cart::analytics",
                    event = event.name(),
                    currency,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_event_names() {
        let id = ProductId::new("elite-pro");
        assert_eq!(
            CartEvent::ItemRemoved { id: id.clone() }.name(),
            "remove_from_cart"
        );
        assert_eq!(CartEvent::Cleared.name(), "clear_cart");
        assert_eq!(
            CartEvent::QuantityChanged {
                id: id.clone(),
                quantity: Quantity::ONE
            }
            .product_id(),
            Some(&id)
        );
        assert_eq!(CartEvent::Cleared.product_id(), None);
    }

    #[test]
    fn test_closure_observer() {
        let seen = RefCell::new(Vec::new());
        let observer = |event: &CartEvent, _state: &CartState| {
            seen.borrow_mut().push(event.name());
        };

        observer.on_event(&CartEvent::Cleared, &CartState::new());
        TracingObserver::default().on_event(&CartEvent::Cleared, &CartState::new());

        assert_eq!(*seen.borrow(), vec!["clear_cart"]);
    }
}
