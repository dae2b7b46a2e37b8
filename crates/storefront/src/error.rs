//! Unified error handling with Sentry integration.
//!
//! Component errors fold into [`AppError`]. Recoverable failures (catalog
//! fallback, cart persistence) never reach this type; anything that does is
//! worth reporting via [`AppError::capture`].

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::newsletter::NewsletterError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog client failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Newsletter signup failed.
    #[error("Newsletter error: {0}")]
    Newsletter(#[from] NewsletterError),

    /// Referenced product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Report to Sentry if this is an unexpected failure, and log it.
    ///
    /// Returns `true` if an event was sent.
    pub fn capture(&self) -> bool {
        if matches!(self, Self::Config(_) | Self::Catalog(_) | Self::Storage(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
            true
        } else {
            tracing::debug!(error = %self, "Storefront error");
            false
        }
    }

    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Newsletter(e) => e.user_message(),
            Self::NotFound(_) => "That product is no longer available.".to_string(),
            Self::Config(_) | Self::Catalog(_) | Self::Storage(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
