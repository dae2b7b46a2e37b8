//! Product listing: the visible product list derived from the catalog.
//!
//! [`derive_listing`] is a pure function of the catalog and the current
//! [`ListingCriteria`]. It filters by search text and category, then applies a
//! stable sort, so products that compare equal keep their catalog order.
//! [`ListingCache`] memoizes the result per catalog revision and criteria.

use std::sync::Arc;

use cornershop_core::Product;
use moka::sync::Cache;

use crate::catalog::Catalog;

/// Listing sort order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Catalog order.
    #[default]
    Featured,
    PriceAscending,
    PriceDescending,
    RatingDescending,
}

impl SortKey {
    /// Every sort key, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Featured,
        Self::PriceAscending,
        Self::PriceDescending,
        Self::RatingDescending,
    ];

    /// Parse from a URL parameter or CLI value. Unknown values mean `Featured`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-asc" | "price-ascending" | "price_asc" => Self::PriceAscending,
            "price-desc" | "price-descending" | "price_desc" => Self::PriceDescending,
            "rating" | "rating-desc" | "rating-descending" | "rating_desc" => {
                Self::RatingDescending
            }
            _ => Self::Featured,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAscending => "price-asc",
            Self::PriceDescending => "price-desc",
            Self::RatingDescending => "rating",
        }
    }

    /// Human-readable label for sort menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceAscending => "Price: Low to High",
            Self::PriceDescending => "Price: High to Low",
            Self::RatingDescending => "Top Rated",
        }
    }
}

/// Category selector.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    /// Every category.
    #[default]
    All,
    /// Products whose category label equals this exactly.
    Only(String),
}

impl CategoryFilter {
    /// The distinguished "every category" value.
    pub const ALL_LABEL: &'static str = "All";

    /// Parse a selector. Only `"All"` selects every category; anything else,
    /// the empty string included, is matched exactly without trimming or case
    /// folding.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == Self::ALL_LABEL {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    /// The selector as shown in a category menu.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL_LABEL,
            Self::Only(category) => category,
        }
    }

    fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category.as_deref() == Some(category.as_str()),
        }
    }
}

/// Transient filter and sort state.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ListingCriteria {
    /// Free-text search; matched case-insensitively after trimming.
    pub search: String,
    /// Category selector.
    pub category: CategoryFilter,
    /// Sort order.
    pub sort: SortKey,
}

impl ListingCriteria {
    /// Returns `true` if no filter or reordering is applied.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.search.trim().is_empty()
            && self.category == CategoryFilter::All
            && self.sort == SortKey::Featured
    }
}

/// Compute the products to display.
///
/// Never mutates or reorders `products` itself; the result borrows from it.
#[must_use]
pub fn derive_listing<'a>(products: &'a [Product], criteria: &ListingCriteria) -> Vec<&'a Product> {
    let needle = criteria.search.trim().to_lowercase();

    let mut listing: Vec<&Product> = products
        .iter()
        .filter(|p| needle.is_empty() || p.mentions(&needle))
        .filter(|p| criteria.category.matches(p))
        .collect();

    // `sort_by` is stable: equal keys keep their filtered order.
    match criteria.sort {
        SortKey::Featured => {}
        SortKey::PriceAscending => listing.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDescending => listing.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::RatingDescending => {
            listing.sort_by(|a, b| b.rating_rate().total_cmp(&a.rating_rate()));
        }
    }

    listing
}

/// Distinct category labels in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in products.iter().filter_map(|p| p.category.as_deref()) {
        if !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

/// Memoized listings keyed by catalog revision and criteria.
#[derive(Clone)]
pub struct ListingCache {
    cache: Cache<(u64, ListingCriteria), Arc<[Product]>>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ListingCache {
    /// Create a cache holding at most `capacity` listings.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// The listing for `catalog` under `criteria`, deriving it on a miss.
    #[must_use]
    pub fn get_or_derive(&self, catalog: &Catalog, criteria: &ListingCriteria) -> Arc<[Product]> {
        self.cache
            .get_with((catalog.revision(), criteria.clone()), || {
                derive_listing(catalog.products(), criteria)
                    .into_iter()
                    .cloned()
                    .collect()
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cornershop_core::{Price, Rating};
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::CatalogSource;

    fn product(id: &str, title: &str, cents: i64, category: &str, rate: Option<f64>) -> Product {
        let p = Product::new(id, title, Price::new(Decimal::new(cents, 2)))
            .with_description(format!("Description of {title}"))
            .with_category(category);
        match rate {
            Some(rate) => p.with_rating(Rating::new(rate, 10)),
            None => p,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("1", "Blue Shirt", 2500, "clothing", Some(4.0)),
            product("2", "Red Mug", 1200, "kitchen", Some(4.5)),
            product("3", "Green Shirt", 2500, "clothing", None),
            product("4", "Espresso Machine", 19900, "kitchen", Some(4.5)),
            product("5", "Wool Socks", 800, "clothing", Some(3.0)),
        ]
    }

    fn ids(listing: &[&Product]) -> Vec<String> {
        listing.iter().map(|p| p.id.to_string()).collect()
    }

    fn criteria(search: &str, category: &str, sort: SortKey) -> ListingCriteria {
        ListingCriteria {
            search: search.to_string(),
            category: CategoryFilter::parse(category),
            sort,
        }
    }

    #[test]
    fn test_no_filters_is_identity() {
        let products = sample();
        let listing = derive_listing(&products, &ListingCriteria::default());
        assert_eq!(ids(&listing), ["1", "2", "3", "4", "5"]);
        assert!(ListingCriteria::default().is_identity());
    }

    #[test]
    fn test_empty_catalog() {
        assert!(derive_listing(&[], &criteria("shirt", "clothing", SortKey::PriceAscending)).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let products = sample();
        let listing = derive_listing(&products, &criteria("  SHIRT ", "All", SortKey::Featured));
        assert_eq!(ids(&listing), ["1", "3"]);
    }

    #[test]
    fn test_search_matches_description() {
        let products = vec![
            product("1", "Kettle", 3000, "kitchen", None).with_description("Boils water fast"),
            product("2", "Mug", 1000, "kitchen", None),
        ];
        let listing = derive_listing(&products, &criteria("water", "All", SortKey::Featured));
        assert_eq!(ids(&listing), ["1"]);
    }

    #[test]
    fn test_search_without_match() {
        let products = sample();
        assert!(derive_listing(&products, &criteria("bicycle", "All", SortKey::Featured)).is_empty());
    }

    #[test]
    fn test_whitespace_search_does_not_filter() {
        let products = sample();
        assert_eq!(derive_listing(&products, &criteria("   ", "All", SortKey::Featured)).len(), 5);
    }

    #[test]
    fn test_category_is_exact() {
        let products = sample();
        let listing = derive_listing(&products, &criteria("", "kitchen", SortKey::Featured));
        assert_eq!(ids(&listing), ["2", "4"]);

        assert!(derive_listing(&products, &criteria("", "Kitchen", SortKey::Featured)).is_empty());
        assert!(derive_listing(&products, &criteria("", "", SortKey::Featured)).is_empty());
    }

    #[test]
    fn test_price_ascending_is_stable() {
        let products = sample();
        let listing = derive_listing(&products, &criteria("", "All", SortKey::PriceAscending));
        assert_eq!(ids(&listing), ["5", "2", "1", "3", "4"]);
    }

    #[test]
    fn test_price_descending_is_stable() {
        let products = sample();
        let listing = derive_listing(&products, &criteria("", "All", SortKey::PriceDescending));
        assert_eq!(ids(&listing), ["4", "1", "3", "2", "5"]);
    }

    #[test]
    fn test_rating_descending_treats_missing_as_zero() {
        let products = sample();
        let listing = derive_listing(&products, &criteria("", "All", SortKey::RatingDescending));
        assert_eq!(ids(&listing), ["2", "4", "1", "5", "3"]);
    }

    #[test]
    fn test_filters_compose() {
        let products = sample();
        let listing = derive_listing(&products, &criteria("shirt", "clothing", SortKey::RatingDescending));
        assert_eq!(ids(&listing), ["1", "3"]);
    }

    #[test]
    fn test_catalog_is_not_mutated() {
        let products = sample();
        let before = products.clone();
        let _ = derive_listing(&products, &criteria("", "All", SortKey::PriceDescending));
        assert_eq!(products, before);
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(categories(&sample()), ["clothing", "kitchen"]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_sort_key_parse() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), key);
        }
        assert_eq!(SortKey::parse("price-ascending"), SortKey::PriceAscending);
        assert_eq!(SortKey::parse("bogus"), SortKey::Featured);
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(""),
            CategoryFilter::Only(String::new())
        );
        assert_eq!(
            CategoryFilter::parse("all"),
            CategoryFilter::Only("all".to_string())
        );
        assert_eq!(CategoryFilter::parse("jewelery").as_str(), "jewelery");
    }

    #[test]
    fn test_cache_is_keyed_by_revision() {
        let cache = ListingCache::default();
        let by_price = criteria("", "All", SortKey::PriceAscending);

        let first = Catalog::new(sample(), CatalogSource::Remote);
        let listing = cache.get_or_derive(&first, &by_price);
        assert_eq!(listing.first().unwrap().id.as_str(), "5");

        let second = Catalog::new(vec![product("9", "Only", 100, "misc", None)], CatalogSource::Remote);
        let listing = cache.get_or_derive(&second, &by_price);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.first().unwrap().id.as_str(), "9");
    }
}
