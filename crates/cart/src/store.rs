//! The cart store.
//!
//! `CartStore` is the single writer of cart state. It is created by the
//! application root and passed to whatever renders or changes the cart.
//! Each operation runs a pure transition from [`crate::transitions`], swaps
//! the result in, saves it, and then notifies observers.

use fittipaldi_core::{CurrencyCode, ProductId};

use crate::error::{CartError, Result};
use crate::events::CartObserver;
use crate::model::{CartState, Product};
use crate::persistence::CartPersistence;
use crate::storage::MemoryStorage;
use crate::transitions::{self, CartAction, Transition};
use crate::view::CartView;

/// Owns the cart state and keeps it persisted.
pub struct CartStore {
    state: CartState,
    persistence: CartPersistence,
    observers: Vec<Box<dyn CartObserver>>,
    currency: CurrencyCode,
    persistent: bool,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("persistence", &self.persistence)
            .field("observers", &self.observers.len())
            .field("currency", &self.currency)
            .field("persistent", &self.persistent)
            .finish()
    }
}

impl CartStore {
    /// Creates a store, restoring whatever `persistence` holds.
    ///
    /// Never fails: a missing, unreadable or invalid slot yields an empty cart.
    #[must_use]
    pub fn open(persistence: CartPersistence) -> Self {
        let state = persistence.load();
        tracing::info!(
            key = persistence.key(),
            lines = state.line_count(),
            "Cart store opened"
        );
        Self {
            state,
            persistence,
            observers: Vec::new(),
            currency: CurrencyCode::default(),
            persistent: true,
        }
    }

    /// Creates a store backed by a fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(CartPersistence::new(Box::new(MemoryStorage::new())))
    }

    /// Set the currency used by [`Self::view`].
    #[must_use]
    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    /// Register an observer for cart events.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Owned copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state.clone()
    }

    /// Display model of the current state.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::from_state(&self.state, self.currency)
    }

    /// `false` while the last save failed and the cart lives only in memory.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Add `quantity` units of `product`, merging with an existing row.
    ///
    /// # Errors
    ///
    /// Returns a validation `CartError`; the cart is unchanged.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> Result<&CartState> {
        self.dispatch(CartAction::Add { product, quantity })
    }

    /// Remove the row for `id`, if any.
    pub fn remove_item(&mut self, id: &ProductId) -> &CartState {
        let transition = transitions::removal(&self.state, id);
        self.commit(transition)
    }

    /// Set the row's quantity; zero or negative removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is too large.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<&CartState> {
        self.dispatch(CartAction::UpdateQuantity {
            id: id.clone(),
            quantity,
        })
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> &CartState {
        let transition = transitions::clearing(&self.state);
        self.commit(transition)
    }

    /// Apply any [`CartAction`].
    ///
    /// # Errors
    ///
    /// Returns a validation `CartError`; the cart is unchanged.
    pub fn dispatch(&mut self, action: CartAction) -> Result<&CartState> {
        match transitions::apply(&self.state, action) {
            Ok(transition) => Ok(self.commit(transition)),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected cart action");
                Err(e)
            }
        }
    }

    /// Place an order for the current cart.
    ///
    /// There is no order system behind the storefront, so this always
    /// reports [`CartError::CheckoutUnavailable`] and leaves the cart as is.
    ///
    /// # Errors
    ///
    /// Always returns [`CartError::CheckoutUnavailable`].
    pub fn checkout(&self) -> Result<()> {
        tracing::warn!(
            lines = self.state.line_count(),
            total = %self.state.total(),
            "Checkout requested but not available"
        );
        Err(CartError::CheckoutUnavailable)
    }

    fn commit(&mut self, transition: Transition) -> &CartState {
        self.state = transition.state;
        self.persist();
        if let Some(event) = &transition.event {
            for observer in &self.observers {
                observer.on_event(event, &self.state);
            }
        }
        &self.state
    }

    fn persist(&mut self) {
        match self.persistence.save(&self.state) {
            Ok(()) => {
                if !self.persistent {
                    tracing::info!(key = self.persistence.key(), "Cart persistence recovered");
                }
                self.persistent = true;
            }
            Err(e) => {
                if self.persistent {
                    tracing::warn!(
                        key = self.persistence.key(),
                        error = %e,
                        "Failed to persist cart, continuing in memory"
                    );
                } else {
                    tracing::debug!(key = self.persistence.key(), error = %e, "Cart still not persisted");
                }
                self.persistent = false;
            }
        }
    }
}
