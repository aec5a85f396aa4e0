//! Cart commands.
//!
//! Each handler changes the store (if needed) and then prints the resulting
//! cart to `out`. Logs go to stderr, so stdout only ever carries the cart.

use std::io::Write;

use fittipaldi_cart::{CartError, CartStore, CartView, Product};
use fittipaldi_core::ProductId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The cart rejected the change.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Writing to the output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// The view could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, CommandError>;

/// Build a product from command-line arguments.
pub fn product(
    id: String,
    name: String,
    price: Decimal,
    description: Option<String>,
    image: Option<String>,
) -> Product {
    let mut product = Product::new(id, name, price);
    if let Some(description) = description {
        product = product.with_description(description);
    }
    if let Some(image) = image {
        product = product.with_image(image);
    }
    product
}

/// Print the cart, as text or as the JSON display model.
pub fn show(store: &CartStore, json: bool, out: &mut impl Write) -> Result<()> {
    let view = store.view();
    if json {
        serde_json::to_writer_pretty(&mut *out, &view)?;
        writeln!(out)?;
    } else {
        render(&view, out)?;
    }
    Ok(())
}

pub fn add(store: &mut CartStore, product: Product, quantity: u32, out: &mut impl Write) -> Result<()> {
    store.add_item(product, quantity)?;
    finish(store, out)
}

pub fn remove(store: &mut CartStore, id: &str, out: &mut impl Write) -> Result<()> {
    let id = ProductId::new(id);
    if !store.state().contains(&id) {
        tracing::info!(id = %id, "Product not in cart, nothing removed");
    }
    store.remove_item(&id);
    finish(store, out)
}

pub fn update(store: &mut CartStore, id: &str, quantity: i64, out: &mut impl Write) -> Result<()> {
    store.update_quantity(&ProductId::new(id), quantity)?;
    finish(store, out)
}

pub fn clear(store: &mut CartStore, out: &mut impl Write) -> Result<()> {
    store.clear();
    finish(store, out)
}

/// Checkout is not offered by the storefront; this reports it as an error.
pub fn checkout(store: &CartStore) -> Result<()> {
    store.checkout()?;
    Ok(())
}

fn finish(store: &CartStore, out: &mut impl Write) -> Result<()> {
    if !store.is_persistent() {
        tracing::warn!("Cart could not be saved; this change is lost when the command exits");
    }
    render(&store.view(), out)?;
    Ok(())
}

/// Render the cart panel as plain text.
pub fn render(view: &CartView, out: &mut impl Write) -> std::io::Result<()> {
    if view.is_empty() {
        return writeln!(out, "Your cart is empty");
    }

    let noun = if view.line_count == 1 { "product" } else { "products" };
    writeln!(out, "Cart ({} {noun}, {} units)", view.line_count, view.item_count)?;
    for item in &view.items {
        writeln!(
            out,
            "  {:>3} x {} [{}] @ {} = {}",
            item.quantity, item.name, item.id, item.price, item.line_price
        )?;
    }
    writeln!(out, "Total: {}", view.total)
}
