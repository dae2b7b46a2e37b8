//! Total coercion of catalog JSON into products.
//!
//! The backend's product records are loosely shaped. Every JSON value maps to
//! a [`Product`]; only a body that is not an array is rejected, and that case
//! is handled by the caller falling back to the static catalog.

use std::str::FromStr;

use cornershop_core::{Price, Product, ProductId, Rating};
use rust_decimal::Decimal;
use serde_json::Value;

/// Title used for records without one.
pub const UNTITLED: &str = "Untitled product";

/// Category used for records without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Coerce a catalog body into products.
///
/// Returns `None` if `body` is not a JSON array.
#[must_use]
pub fn coerce_products(body: &Value) -> Option<Vec<Product>> {
    body.as_array()
        .map(|records| records.iter().map(coerce_product).collect())
}

/// Coerce a single record. Never fails; missing or mistyped fields get defaults.
#[must_use]
pub fn coerce_product(record: &Value) -> Product {
    Product {
        id: coerce_id(record.get("id")),
        title: non_blank(record.get("title")).unwrap_or_else(|| UNTITLED.to_string()),
        description: non_blank(record.get("description")).unwrap_or_default(),
        price: record.get("price").and_then(decimal).map_or(Price::ZERO, Price::new),
        image: non_blank(record.get("image")),
        category: Some(
            non_blank(record.get("category")).unwrap_or_else(|| UNCATEGORIZED.to_string()),
        ),
        rating: record.get("rating").and_then(coerce_rating),
    }
}

/// Short name of a JSON value's type, for error messages.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_id(value: Option<&Value>) -> ProductId {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => ProductId::new(s.trim()),
        Some(Value::Number(n)) => ProductId::new(n.to_string()),
        _ => ProductId::generate(),
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Read a number or numeric string as a decimal.
fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().map(|f| Price::from_f64(f).amount())),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s).ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| Price::from_f64(f).amount())
            })
        }
        _ => None,
    }
}

fn coerce_rating(value: &Value) -> Option<Rating> {
    let rate = value.get("rate").and_then(decimal)?;
    let rate = rate.to_string().parse::<f64>().ok()?;

    let count = match value.get("count") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| float_to_count(f.floor())))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };

    Some(Rating::new(rate, count))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_count(f: f64) -> u64 {
    // `as` saturates for out-of-range floats.
    f as u64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_record() {
        let product = coerce_product(&json!({
            "id": 3,
            "title": "Mens Cotton Jacket",
            "description": "Great outerwear",
            "price": 55.99,
            "image": "https://img.test/3.jpg",
            "category": "men's clothing",
            "rating": { "rate": 4.7, "count": 500 }
        }));

        assert_eq!(product.id.as_str(), "3");
        assert_eq!(product.title, "Mens Cotton Jacket");
        assert_eq!(product.price.amount(), Decimal::new(5599, 2));
        assert_eq!(product.image.as_deref(), Some("https://img.test/3.jpg"));
        assert_eq!(product.category.as_deref(), Some("men's clothing"));
        let rating = product.rating.unwrap();
        assert!((rating.rate - 4.7).abs() < 1e-9);
        assert_eq!(rating.count, 500);
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let product = coerce_product(&json!({}));
        assert!(product.id.is_generated());
        assert_eq!(product.title, UNTITLED);
        assert_eq!(product.description, "");
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.category.as_deref(), Some(UNCATEGORIZED));
        assert!(product.image.is_none());
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_non_object_records_are_coerced() {
        for record in [json!(null), json!(42), json!("text"), json!([1, 2]), json!(true)] {
            let product = coerce_product(&record);
            assert!(product.id.is_generated());
            assert_eq!(product.title, UNTITLED);
        }
    }

    #[test]
    fn test_mistyped_fields() {
        let product = coerce_product(&json!({
            "id": { "nested": true },
            "title": 17,
            "price": "not a price",
            "category": "",
            "rating": "five stars"
        }));
        assert!(product.id.is_generated());
        assert_eq!(product.title, UNTITLED);
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.category.as_deref(), Some(UNCATEGORIZED));
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_numeric_strings_and_negative_values() {
        let product = coerce_product(&json!({
            "id": " abc ",
            "price": " 12.50 ",
            "rating": { "rate": "9", "count": -4 }
        }));
        assert_eq!(product.id.as_str(), "abc");
        assert_eq!(product.price.amount(), Decimal::new(1250, 2));
        let rating = product.rating.unwrap();
        assert!((rating.rate - 5.0).abs() < f64::EPSILON);
        assert_eq!(rating.count, 0);

        let negative = coerce_product(&json!({ "price": -3 }));
        assert_eq!(negative.price, Price::ZERO);
    }

    #[test]
    fn test_scientific_notation_price() {
        let product = coerce_product(&json!({ "price": "1.5e2" }));
        assert_eq!(product.price.amount(), Decimal::new(150, 0));

        let product = coerce_product(&json!({ "price": "2.5E-1" }));
        assert_eq!(product.price.amount(), Decimal::new(25, 2));

        for text in ["NaN", "inf", "1e400"] {
            assert_eq!(coerce_product(&json!({ "price": text })).price, Price::ZERO, "{text}");
        }
    }

    #[test]
    fn test_huge_price_does_not_fail() {
        let product = coerce_product(&json!({ "price": 1e300 }));
        assert!(product.price >= Price::ZERO);
    }

    #[test]
    fn test_rating_without_count() {
        let product = coerce_product(&json!({ "rating": { "rate": 3.5 } }));
        assert_eq!(product.rating.unwrap().count, 0);
    }

    #[test]
    fn test_non_array_body() {
        assert!(coerce_products(&json!({ "products": [] })).is_none());
        assert!(coerce_products(&json!("oops")).is_none());
        assert_eq!(coerce_products(&json!([])).unwrap().len(), 0);
        assert_eq!(coerce_products(&json!([{}, {}])).unwrap().len(), 2);
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!({})), "object");
        assert_eq!(json_kind(&json!(null)), "null");
    }
}
