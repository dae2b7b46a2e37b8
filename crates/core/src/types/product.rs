//! Catalog product records.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Customer rating summary for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating in `[0, 5]`.
    pub rate: f64,
    /// Number of ratings.
    pub count: u64,
}

impl Rating {
    /// Highest possible rating.
    pub const MAX_RATE: f64 = 5.0;

    /// Create a rating, clamping `rate` into `[0, 5]`.
    ///
    /// A non-finite rate is treated as zero.
    #[must_use]
    pub fn new(rate: f64, count: u64) -> Self {
        let rate = if rate.is_finite() {
            rate.clamp(0.0, Self::MAX_RATE)
        } else {
            0.0
        };
        Self { rate, count }
    }
}

/// A product as displayed by the storefront.
///
/// Products are immutable once fetched; the storefront only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier, unique within the catalog.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Customer rating summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Product {
    /// Create a product with an empty description and no image, category or
    /// rating.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price,
            image: None,
            category: None,
            rating: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Rating used for ordering; products without a rating rank as zero.
    #[must_use]
    pub fn rating_rate(&self) -> f64 {
        self.rating.map_or(0.0, |r| r.rate)
    }

    /// Returns `true` if the title or description contains `needle`.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}
