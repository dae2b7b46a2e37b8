//! Application state shared across pages.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::newsletter::{NewsletterClient, Subscriber};
use crate::page::StorefrontPage;
use crate::search::SearchNavigation;
use crate::storage::{FileStorage, LocalStorage};

/// Storage handle shared by every page.
pub type SharedStorage = Arc<dyn LocalStorage>;

/// Application state shared across all pages.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the HTTP clients, storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    subscriber: Subscriber,
    search: SearchNavigation,
    storage: SharedStorage,
}

impl AppState {
    /// Create state with file storage under the configured directory, the
    /// backend newsletter endpoint and default search navigation.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let storage: SharedStorage = Arc::new(FileStorage::new(config.storage_dir.clone()));
        let subscriber = Subscriber::Http(NewsletterClient::new(&config)?);
        Self::with_parts(config, storage, subscriber, SearchNavigation::default())
    }

    /// Create state with injected storage and handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client fails to build.
    pub fn with_parts(
        config: StorefrontConfig,
        storage: SharedStorage,
        subscriber: Subscriber,
        search: SearchNavigation,
    ) -> Result<Self> {
        let catalog = CatalogClient::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                subscriber,
                search,
                storage,
            }),
        })
    }

    /// Open a page, hydrating the cart from storage.
    #[must_use]
    pub fn page(&self) -> StorefrontPage<SharedStorage> {
        let cart = CartStore::load(Arc::clone(&self.inner.storage), &self.inner.config.cart_key);
        StorefrontPage::new(cart)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    #[must_use]
    pub fn subscriber(&self) -> &Subscriber {
        &self.inner.subscriber
    }

    #[must_use]
    pub fn search(&self) -> &SearchNavigation {
        &self.inner.search
    }

    #[must_use]
    pub fn storage(&self) -> &SharedStorage {
        &self.inner.storage
    }
}
