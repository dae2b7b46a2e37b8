//! Static catalog shown when the backend cannot provide one.

use cornershop_core::{Price, Product, Rating};
use rust_decimal::Decimal;

/// The fixed fallback products, in featured order.
#[must_use]
pub fn fallback_products() -> Vec<Product> {
    vec![
        Product::new("sample-1", "Classic Cotton Tee", Price::new(Decimal::new(1999, 2)))
            .with_description("Soft, breathable everyday t-shirt in heavyweight organic cotton.")
            .with_image("/images/samples/cotton-tee.jpg")
            .with_category("men's clothing")
            .with_rating(Rating::new(4.1, 259)),
        Product::new("sample-2", "Canvas Weekender Bag", Price::new(Decimal::new(4900, 2)))
            .with_description("Roomy waxed-canvas bag with leather handles for short trips.")
            .with_image("/images/samples/weekender-bag.jpg")
            .with_category("women's clothing")
            .with_rating(Rating::new(4.6, 132)),
        Product::new("sample-3", "Wireless Earbuds", Price::new(Decimal::new(7999, 2)))
            .with_description("Bluetooth earbuds with a pocket charging case and 24h battery.")
            .with_image("/images/samples/earbuds.jpg")
            .with_category("electronics")
            .with_rating(Rating::new(3.9, 411)),
        Product::new("sample-4", "Sterling Silver Ring", Price::new(Decimal::new(2950, 2)))
            .with_description("Minimal band ring in polished 925 sterling silver.")
            .with_image("/images/samples/silver-ring.jpg")
            .with_category("jewelery")
            .with_rating(Rating::new(4.7, 88)),
    ]
}
