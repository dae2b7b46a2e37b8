//! Product catalog source.
//!
//! # Architecture
//!
//! - `GET {api}/api/products` returns a JSON array of loosely shaped records,
//!   coerced into [`Product`]s by [`coerce`]
//! - Any failure (network, HTTP status, malformed or non-array body) resolves
//!   to the static [`fallback`] catalog; the error is logged, not surfaced
//! - Successful fetches are cached in-process via `moka` for the configured TTL
//! - [`CatalogLoad`] runs a fetch on a background task that can be cancelled
//!
//! # Example
//!
//! ```rust,ignore
//! use cornershop_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config)?;
//! let catalog = client.fetch_catalog().await;
//! println!("{} products ({:?})", catalog.len(), catalog.source());
//! ```

pub mod coerce;
pub mod fallback;
mod load;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cornershop_core::{Product, ProductId};
use moka::sync::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::StorefrontConfig;

pub use load::{CancelHandle, CatalogLoad, LOAD_FAILED_MESSAGE, LoadOutcome};

/// Errors that can occur while fetching the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Catalog endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// Body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Body was valid JSON but not an array.
    #[error("Expected a JSON array of products, got {0}")]
    NotAList(&'static str),
}

// =============================================================================
// Catalog
// =============================================================================

/// Where a catalog's products came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Fetched from the backend.
    Remote,
    /// The static fallback list.
    Fallback,
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// An immutable, cheaply cloneable product list in featured order.
///
/// Every catalog gets a process-unique revision, which derived views use as
/// part of their cache key.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<[Product]>,
    source: CatalogSource,
    revision: u64,
}

impl Catalog {
    /// Wrap a product list.
    #[must_use]
    pub fn new(products: Vec<Product>, source: CatalogSource) -> Self {
        Self {
            products: products.into(),
            source,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The static fallback catalog.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(fallback::fallback_products(), CatalogSource::Fallback)
    }

    /// Products in featured (fetch) order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Where the products came from.
    #[must_use]
    pub const fn source(&self) -> CatalogSource {
        self.source
    }

    /// Process-unique revision of this catalog.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a product by identifier.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns `true` if there are no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the backend's product endpoint.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<SecretString>,
    cache: Cache<String, Catalog>,
}

impl CatalogClient {
    /// Create a catalog client from storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                endpoint: config.products_url(),
                token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// The URL products are fetched from.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Fetch the catalog, resolving any failure to the fallback catalog.
    ///
    /// Successful fetches are served from cache until the TTL expires; the
    /// fallback is never cached, so the next call tries the backend again.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn fetch_catalog(&self) -> Catalog {
        let key = self.inner.endpoint.to_string();
        if let Some(catalog) = self.inner.cache.get(&key) {
            debug!(products = catalog.len(), "Serving catalog from cache");
            return catalog;
        }

        match self.try_fetch_products().await {
            Ok(products) => {
                debug!(products = products.len(), "Fetched catalog");
                let catalog = Catalog::new(products, CatalogSource::Remote);
                self.inner.cache.insert(key, catalog.clone());
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed; using fallback products");
                Catalog::fallback()
            }
        }
    }

    /// Fetch and coerce the remote product list without falling back.
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-success status, invalid JSON or
    /// a body that is not a JSON array.
    pub async fn try_fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut request = self.inner.client.get(self.inner.endpoint.clone());
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Catalog endpoint returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        coerce::coerce_products(&value).ok_or(CatalogError::NotAList(coerce::json_kind(&value)))
    }

    /// Drop any cached catalog so the next fetch goes to the backend.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }
}
