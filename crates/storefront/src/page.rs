//! Storefront page controller.
//!
//! All page state lives in [`StorefrontPage`] and changes only through
//! [`StorefrontPage::dispatch`]. The visible product list is never stored; it
//! is derived from the catalog and the current criteria on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut page = state.page();
//! page.load_catalog(state.catalog()).await?;
//! page.dispatch(PageEvent::SortChanged(SortKey::PriceAscending))?;
//! for product in page.visible_products().iter() {
//!     println!("{} {}", product.title, product.price);
//! }
//! ```

use std::sync::Arc;

use cornershop_core::{Cart, CartItem, Price, Product, ProductId};
use tracing::{debug, info, warn};

use crate::cart::CartStore;
use crate::catalog::{CancelHandle, Catalog, CatalogClient, CatalogLoad, LoadOutcome};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::listing::{self, CategoryFilter, ListingCache, ListingCriteria, SortKey};
use crate::newsletter::{Subscriber, SubscriptionStatus};
use crate::search::{SearchAction, SearchNavigation};
use crate::storage::LocalStorage;

/// Catalog load state.
#[derive(Debug, Clone)]
pub enum CatalogState {
    /// A load is pending.
    Loading,
    /// Products are available.
    Ready(Catalog),
    /// The load itself failed; carries the message to display.
    Failed(String),
}

/// Everything that can change page state.
#[derive(Debug, Clone)]
pub enum PageEvent {
    CatalogLoaded(Catalog),
    CatalogFailed(String),
    SearchChanged(String),
    CategorySelected(CategoryFilter),
    SortChanged(SortKey),
    /// Back to no search, every category, featured order.
    ResetFilters,
    AddToCart {
        product_id: ProductId,
        quantity: u32,
    },
    /// Set an item's quantity; zero or less removes it.
    UpdateQuantity {
        product_id: ProductId,
        quantity: i64,
    },
    RemoveFromCart(ProductId),
    ClearCart,
    OpenCart,
    CloseCart,
    OpenQuickView(ProductId),
    CloseQuickView,
    NewsletterSubmitted,
    NewsletterFinished(SubscriptionStatus),
}

/// State of one storefront page.
pub struct StorefrontPage<S> {
    catalog: CatalogState,
    criteria: ListingCriteria,
    cart: CartStore<S>,
    cart_open: bool,
    quick_view: Option<Product>,
    newsletter: SubscriptionStatus,
    listings: ListingCache,
    pending_load: Option<CancelHandle>,
}

impl<S: LocalStorage> StorefrontPage<S> {
    /// Create a page around a hydrated cart. The catalog starts out loading.
    #[must_use]
    pub fn new(cart: CartStore<S>) -> Self {
        Self {
            catalog: CatalogState::Loading,
            criteria: ListingCriteria::default(),
            cart,
            cart_open: false,
            quick_view: None,
            newsletter: SubscriptionStatus::Idle,
            listings: ListingCache::default(),
            pending_load: None,
        }
    }

    /// Apply an event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the event names a product that is not
    /// in the loaded catalog. State is unchanged in that case.
    pub fn dispatch(&mut self, event: PageEvent) -> Result<()> {
        match event {
            PageEvent::CatalogLoaded(catalog) => {
                info!(
                    products = catalog.len(),
                    source = ?catalog.source(),
                    "Catalog ready"
                );
                self.pending_load = None;
                self.catalog = CatalogState::Ready(catalog);
            }
            PageEvent::CatalogFailed(message) => {
                warn!(message = %message, "Catalog load failed");
                self.pending_load = None;
                self.catalog = CatalogState::Failed(message);
            }
            PageEvent::SearchChanged(search) => self.criteria.search = search,
            PageEvent::CategorySelected(category) => self.criteria.category = category,
            PageEvent::SortChanged(sort) => self.criteria.sort = sort,
            PageEvent::ResetFilters => self.criteria = ListingCriteria::default(),
            PageEvent::AddToCart {
                product_id,
                quantity,
            } => {
                let product = self.require_product(&product_id)?.clone();
                add_breadcrumb(
                    "cart",
                    "Added to cart",
                    Some(&[("product_id", product_id.as_str())]),
                );
                self.cart.add(product, quantity);
            }
            PageEvent::UpdateQuantity {
                product_id,
                quantity,
            } => {
                let quantity_text = quantity.to_string();
                add_breadcrumb(
                    "cart",
                    "Updated cart quantity",
                    Some(&[
                        ("product_id", product_id.as_str()),
                        ("quantity", quantity_text.as_str()),
                    ]),
                );
                if !self.cart.update_quantity(&product_id, quantity) {
                    debug!(product_id = %product_id, "Quantity update for item not in cart");
                }
            }
            PageEvent::RemoveFromCart(product_id) => {
                add_breadcrumb(
                    "cart",
                    "Removed from cart",
                    Some(&[("product_id", product_id.as_str())]),
                );
                self.cart.remove(&product_id);
            }
            PageEvent::ClearCart => {
                add_breadcrumb("cart", "Cleared cart", None);
                self.cart.clear();
            }
            PageEvent::OpenCart => self.cart_open = true,
            PageEvent::CloseCart => self.cart_open = false,
            PageEvent::OpenQuickView(product_id) => {
                self.quick_view = Some(self.require_product(&product_id)?.clone());
            }
            PageEvent::CloseQuickView => self.quick_view = None,
            PageEvent::NewsletterSubmitted => self.newsletter = SubscriptionStatus::Submitting,
            PageEvent::NewsletterFinished(status) => self.newsletter = status,
        }
        Ok(())
    }

    fn require_product(&self, product_id: &ProductId) -> Result<&Product> {
        self.catalog()
            .and_then(|c| c.find(product_id))
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))
    }

    // -------------------------------------------------------------------------
    // Catalog loading
    // -------------------------------------------------------------------------

    /// Start loading the catalog in the background, cancelling any load
    /// already pending. Must be called within a tokio runtime.
    pub fn begin_catalog_load(&mut self, client: &CatalogClient) -> CatalogLoad {
        self.cancel_pending_load();
        let load = CatalogLoad::spawn(client.clone());
        self.pending_load = Some(load.cancel_handle());
        self.catalog = CatalogState::Loading;
        load
    }

    /// Apply the result of a background load. Cancelled loads change nothing.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`StorefrontPage::dispatch`].
    pub fn apply_load_outcome(&mut self, outcome: LoadOutcome) -> Result<()> {
        match outcome {
            LoadOutcome::Loaded(catalog) => self.dispatch(PageEvent::CatalogLoaded(catalog)),
            LoadOutcome::Failed(message) => self.dispatch(PageEvent::CatalogFailed(message)),
            LoadOutcome::Cancelled => {
                debug!("Ignoring cancelled catalog load");
                Ok(())
            }
        }
    }

    /// Load the catalog and apply the result.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`StorefrontPage::dispatch`].
    pub async fn load_catalog(&mut self, client: &CatalogClient) -> Result<()> {
        let load = self.begin_catalog_load(client);
        let outcome = load.finish().await;
        self.apply_load_outcome(outcome)
    }

    /// Cancel any pending load. A result that arrives afterwards is discarded.
    pub fn teardown(&mut self) {
        self.cancel_pending_load();
    }

    fn cancel_pending_load(&mut self) {
        if let Some(handle) = self.pending_load.take() {
            debug!("Cancelling pending catalog load");
            handle.cancel();
        }
    }

    // -------------------------------------------------------------------------
    // Newsletter and search
    // -------------------------------------------------------------------------

    /// Submit the newsletter form and record the resulting status.
    pub async fn subscribe(&mut self, subscriber: &Subscriber, input: &str) -> SubscriptionStatus {
        self.newsletter = SubscriptionStatus::Submitting;
        let status = SubscriptionStatus::from_result(&subscriber.submit(input).await);
        self.newsletter = status.clone();
        status
    }

    /// Submit the header search box.
    pub fn submit_search(&self, navigation: &SearchNavigation, query: &str) -> SearchAction {
        navigation.submit(query)
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// The products to display under the current criteria.
    #[must_use]
    pub fn visible_products(&self) -> Arc<[Product]> {
        self.catalog().map_or_else(
            || Arc::from(Vec::new()),
            |catalog| self.listings.get_or_derive(catalog, &self.criteria),
        )
    }

    /// Category labels for the filter menu, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.catalog()
            .map(|c| listing::categories(c.products()))
            .unwrap_or_default()
    }

    /// The loaded catalog, if any.
    #[must_use]
    pub const fn catalog(&self) -> Option<&Catalog> {
        match &self.catalog {
            CatalogState::Ready(catalog) => Some(catalog),
            CatalogState::Loading | CatalogState::Failed(_) => None,
        }
    }

    /// Catalog load state.
    #[must_use]
    pub const fn catalog_state(&self) -> &CatalogState {
        &self.catalog
    }

    /// Returns `true` while a catalog load is pending.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.catalog, CatalogState::Loading)
    }

    /// Message to show if the load failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        match &self.catalog {
            CatalogState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn criteria(&self) -> &ListingCriteria {
        &self.criteria
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    #[must_use]
    pub fn cart_items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart.subtotal()
    }

    /// Total units in the cart, for the header badge.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    #[must_use]
    pub const fn quick_view(&self) -> Option<&Product> {
        self.quick_view.as_ref()
    }

    #[must_use]
    pub const fn newsletter_status(&self) -> &SubscriptionStatus {
        &self.newsletter
    }
}

impl<S> Drop for StorefrontPage<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_load.take() {
            handle.cancel();
        }
    }
}
