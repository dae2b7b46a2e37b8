//! Cart commands.
//!
//! Each command hydrates the cart from storage, applies one event and lets the
//! cart store write it back.

use cornershop_core::ProductId;
use cornershop_storefront::{AppState, PageEvent};
use tracing::info;

/// Print cart contents and subtotal.
#[allow(clippy::print_stdout)]
pub fn show(state: &AppState) {
    let page = state.page();
    if page.cart().is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in page.cart_items() {
        println!(
            "{:<16} {:>4} x {:>10}  {:>10}  {}",
            item.product.id,
            item.quantity,
            item.product.price.to_string(),
            item.line_total().to_string(),
            item.product.title
        );
    }
    println!("{} item(s), subtotal {}", page.cart_count(), page.subtotal());
}

/// Add a catalog product to the cart.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or has no such product.
pub async fn add(
    state: &AppState,
    product_id: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    page.load_catalog(state.catalog()).await?;
    if let Some(message) = page.load_error() {
        return Err(message.into());
    }

    page.dispatch(PageEvent::AddToCart {
        product_id: ProductId::new(product_id),
        quantity,
    })?;
    info!(product_id, quantity, "Added to cart");
    show(state);
    Ok(())
}

/// Set the quantity of a cart item.
///
/// # Errors
///
/// Returns an error if the event is rejected.
pub fn update(
    state: &AppState,
    product_id: &str,
    quantity: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    page.dispatch(PageEvent::UpdateQuantity {
        product_id: ProductId::new(product_id),
        quantity,
    })?;
    show(state);
    Ok(())
}

/// Remove a cart item.
///
/// # Errors
///
/// Returns an error if the event is rejected.
pub fn remove(state: &AppState, product_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    page.dispatch(PageEvent::RemoveFromCart(ProductId::new(product_id)))?;
    show(state);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the event is rejected.
pub fn clear(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    page.dispatch(PageEvent::ClearCart)?;
    show(state);
    Ok(())
}
