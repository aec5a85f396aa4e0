//! Pure cart transitions.
//!
//! Every function here takes the current state by reference and returns a
//! new one; nothing touches storage or observers. The total of every
//! returned state is recomputed from its rows.

use fittipaldi_core::{ProductId, Quantity};

use crate::error::{CartError, Result};
use crate::events::CartEvent;
use crate::model::{CartItem, CartState, Product};

/// A request to change the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add `quantity` units of `product`, merging into an existing row.
    Add { product: Product, quantity: u32 },
    /// Remove the row for `id`.
    Remove { id: ProductId },
    /// Set the row's quantity; zero or negative removes it.
    UpdateQuantity { id: ProductId, quantity: i64 },
    /// Empty the cart.
    Clear,
}

/// Result of applying an action: the next state and what changed, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: CartState,
    pub event: Option<CartEvent>,
}

/// Add `quantity` units of `product`.
///
/// If a row with the same id exists its quantity grows and its stored name,
/// description, image and price are kept; otherwise a row is appended.
///
/// # Errors
///
/// - [`CartError::InvalidQuantity`] if `quantity` is zero
/// - [`CartError::EmptyProductId`] / [`CartError::NegativePrice`] for bad products
/// - [`CartError::QuantityOverflow`] if the merged quantity does not fit
/// - [`CartError::TotalOverflow`] if the new line or total does not fit
pub fn add_item(state: &CartState, product: Product, quantity: u32) -> Result<CartState> {
    let quantity = Quantity::new(quantity)?;
    product.validate()?;

    let mut items = state.items().to_vec();
    if let Some(existing) = items.iter_mut().find(|item| item.id == product.id) {
        existing.quantity = existing
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| CartError::QuantityOverflow(product.id.clone()))?;
    } else {
        items.push(CartItem::from_product(product, quantity));
    }

    CartState::from_items(items)
}

/// Remove the row for `id`. Absent ids leave the state as it was.
#[must_use]
pub fn remove_item(state: &CartState, id: &ProductId) -> CartState {
    state.retain(|item| &item.id != id)
}

/// Set the quantity of the row for `id`.
///
/// A `quantity` of zero or less removes the row. Absent ids are a no-op.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] if `quantity` exceeds `u32::MAX`,
/// or [`CartError::TotalOverflow`] if the new line or total does not fit.
pub fn update_quantity(state: &CartState, id: &ProductId, quantity: i64) -> Result<CartState> {
    if quantity <= 0 {
        return Ok(remove_item(state, id));
    }
    let quantity = Quantity::try_from(quantity)?;

    let items = state
        .items()
        .iter()
        .map(|item| {
            if &item.id == id {
                CartItem {
                    quantity,
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect();
    CartState::from_items(items)
}

/// Empty the cart.
#[must_use]
pub const fn clear(_state: &CartState) -> CartState {
    CartState::new()
}

/// Apply `action` to `state`.
///
/// The returned [`Transition`] carries an event only when the cart actually
/// changed; removing an absent id or clearing an empty cart yields `None`.
///
/// # Errors
///
/// Propagates the validation errors of the underlying transition; `state`
/// is left untouched.
pub fn apply(state: &CartState, action: CartAction) -> Result<Transition> {
    match action {
        CartAction::Add { product, quantity } => {
            let added = Quantity::new(quantity)?;
            let id = product.id.clone();
            let next = add_item(state, product, quantity)?;
            let event = next.get(&id).map(|row| CartEvent::ItemAdded {
                id: row.id.clone(),
                name: row.name.clone(),
                quantity: added,
                unit_price: row.price,
            });
            Ok(Transition { state: next, event })
        }
        CartAction::Remove { id } => Ok(removal(state, &id)),
        CartAction::UpdateQuantity { id, quantity } => {
            let next = update_quantity(state, &id, quantity)?;
            let event = match (state.get(&id), next.get(&id)) {
                (Some(_), None) => Some(CartEvent::ItemRemoved { id }),
                (Some(before), Some(after)) if before.quantity != after.quantity => {
                    Some(CartEvent::QuantityChanged {
                        id,
                        quantity: after.quantity,
                    })
                }
                _ => None,
            };
            Ok(Transition { state: next, event })
        }
        CartAction::Clear => Ok(clearing(state)),
    }
}

/// [`remove_item`] with its event; removal cannot fail.
#[must_use]
pub fn removal(state: &CartState, id: &ProductId) -> Transition {
    let event = state
        .contains(id)
        .then(|| CartEvent::ItemRemoved { id: id.clone() });
    Transition {
        state: remove_item(state, id),
        event,
    }
}

/// [`clear`] with its event; clearing cannot fail.
#[must_use]
pub fn clearing(state: &CartState) -> Transition {
    let event = (!state.is_empty()).then_some(CartEvent::Cleared);
    Transition {
        state: clear(state),
        event,
    }
}
