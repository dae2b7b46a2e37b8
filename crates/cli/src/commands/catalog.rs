//! Catalog listing commands.

use cornershop_core::Product;
use cornershop_storefront::catalog::CatalogSource;
use cornershop_storefront::listing::{CategoryFilter, SortKey};
use cornershop_storefront::{AppState, PageEvent};
use tracing::{info, warn};

/// List products matching the given search, category and sort.
///
/// # Errors
///
/// Returns an error if the catalog load task fails.
#[allow(clippy::print_stdout)]
pub async fn products(
    state: &AppState,
    search: &str,
    category: &str,
    sort: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    page.load_catalog(state.catalog()).await?;
    if let Some(message) = page.load_error() {
        return Err(message.into());
    }
    if page.catalog().is_some_and(|c| c.source() == CatalogSource::Fallback) {
        warn!("Backend unavailable; showing sample products");
    }

    page.dispatch(PageEvent::SearchChanged(search.to_string()))?;
    page.dispatch(PageEvent::CategorySelected(CategoryFilter::parse(category)))?;
    page.dispatch(PageEvent::SortChanged(SortKey::parse(sort)))?;

    let products = page.visible_products();
    info!(
        count = products.len(),
        sort = page.criteria().sort.label(),
        "Listing products"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&*products)?);
        return Ok(());
    }

    if products.is_empty() {
        println!("No products found.");
    }
    for product in products.iter() {
        println!("{}", format_row(product));
    }
    Ok(())
}

/// List the catalog's categories in first-seen order.
///
/// # Errors
///
/// Returns an error if the catalog load task fails.
#[allow(clippy::print_stdout)]
pub async fn categories(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    page.load_catalog(state.catalog()).await?;
    if let Some(message) = page.load_error() {
        return Err(message.into());
    }

    println!("{}", CategoryFilter::ALL_LABEL);
    for category in page.categories() {
        println!("{category}");
    }
    Ok(())
}

fn format_row(product: &Product) -> String {
    let rating = product
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{:.1} ({})", r.rate, r.count));
    format!(
        "{:<16} {:>10}  {:<5} {:<12}  {}",
        product.id,
        product.price.to_string(),
        rating,
        product.category.as_deref().unwrap_or(""),
        product.title
    )
}

#[cfg(test)]
mod tests {
    use cornershop_core::{Price, Rating};

    use super::*;

    #[test]
    fn test_format_row() {
        let product = Product::new("p-1", "Mug", Price::from_f64(12.5))
            .with_category("kitchen")
            .with_rating(Rating::new(4.25, 7));
        let row = format_row(&product);
        assert!(row.starts_with("p-1"));
        assert!(row.contains("12.50"));
        assert!(row.contains("kitchen"));
        assert!(row.ends_with("Mug"));
    }
}
