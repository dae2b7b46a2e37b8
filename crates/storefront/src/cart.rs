//! Cart store: the in-memory cart mirrored to local storage.
//!
//! The in-memory [`Cart`] is authoritative for the session. After every
//! mutation the whole cart is serialized and written to a single storage slot;
//! at startup that slot is read back. Storage failures of any kind (missing
//! slot, corrupt JSON, quota exceeded, unwritable disk) are logged and
//! otherwise ignored, so the cart always stays usable.

use cornershop_core::{Cart, CartItem, Price, Product, ProductId};
use tracing::{debug, instrument, warn};

use crate::storage::{LocalStorage, StorageError};

/// Why the last persistence attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The backend refused the read or write.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The slot held something that is not a serialized cart.
    #[error("Corrupt cart data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Cart with a persistence mirror in a named storage slot.
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
    key: String,
}

impl<S: LocalStorage> CartStore<S> {
    /// Hydrate a cart from the slot `key`.
    ///
    /// A missing slot, unreadable storage or unparsable contents all yield an
    /// empty cart.
    #[instrument(skip(storage))]
    pub fn load(storage: S, key: &str) -> Self {
        let cart = match read_cart(&storage, key) {
            Ok(Some(cart)) => {
                debug!(items = cart.len(), "Hydrated cart from storage");
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart; starting empty");
                Cart::new()
            }
        };

        Self {
            cart,
            storage,
            key: key.to_string(),
        }
    }

    /// Add `quantity` of `product`, merging with an existing item.
    pub fn add(&mut self, product: Product, quantity: u32) {
        self.cart.add(product, quantity);
        self.persist();
    }

    /// Set the quantity for `product_id`; zero or less removes the item.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        let found = self.cart.update_quantity(product_id, quantity);
        self.persist();
        found
    }

    /// Remove the item for `product_id`.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let found = self.cart.remove(product_id);
        self.persist();
        found
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    /// Sum of price times quantity, recomputed on every call.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart.subtotal()
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The storage slot this cart mirrors to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the cart to its slot, logging (not returning) any failure.
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(key = %self.key, error = %e, "Failed to persist cart; keeping in-memory state");
        }
    }

    /// Write the cart to its slot.
    ///
    /// # Errors
    ///
    /// Returns the serialization or storage failure.
    pub fn try_persist(&self) -> Result<(), PersistError> {
        let json = serde_json::to_string(&self.cart)?;
        self.storage.set_item(&self.key, &json)?;
        Ok(())
    }
}

fn read_cart<S: LocalStorage>(storage: &S, key: &str) -> Result<Option<Cart>, PersistError> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    const KEY: &str = "cart";

    fn product(id: &str, cents: i64) -> Product {
        Product::new(id, format!("Product {id}"), Price::new(Decimal::new(cents, 2)))
            .with_category("misc")
    }

    fn pairs<S: LocalStorage>(store: &CartStore<S>) -> Vec<(String, u32)> {
        store
            .items()
            .iter()
            .map(|i| (i.product.id.to_string(), i.quantity))
            .collect()
    }

    #[test]
    fn test_starts_empty_without_slot() {
        let store = CartStore::load(MemoryStorage::new(), KEY);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_corrupt_slot_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY, "{not json").unwrap();

        let store = CartStore::load(storage, KEY);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_wrong_shape_slot_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY, r#"{"items": []}"#).unwrap();

        let store = CartStore::load(storage, KEY);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_every_mutation_is_mirrored() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::load(Arc::clone(&storage), KEY);

        store.add(product("a", 1999), 2);
        let saved: Cart = serde_json::from_str(&storage.get_item(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.item_count(), 2);

        store.update_quantity(&ProductId::new("a"), 5);
        let saved: Cart = serde_json::from_str(&storage.get_item(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.item_count(), 5);

        store.clear();
        assert_eq!(storage.get_item(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_reload_reproduces_pairs() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::load(Arc::clone(&storage), KEY);
        store.add(product("a", 1999), 2);
        store.add(product("b", 4900), 1);
        store.add(product("c", 500), 3);
        store.remove(&ProductId::new("c"));

        let reloaded = CartStore::load(Arc::clone(&storage), KEY);
        assert_eq!(pairs(&reloaded), pairs(&store));
        assert_eq!(pairs(&reloaded), [("a".to_string(), 2), ("b".to_string(), 1)]);
        assert_eq!(reloaded.subtotal().amount(), Decimal::new(8898, 2));
    }

    #[test]
    fn test_quota_failure_keeps_memory_state() {
        let mut store = CartStore::load(MemoryStorage::with_quota(16), KEY);

        store.add(product("a", 1999), 1);
        store.add(product("a", 1999), 2);

        assert_eq!(store.item_count(), 3);
        assert!(matches!(
            store.try_persist(),
            Err(PersistError::Storage(StorageError::QuotaExceeded { .. }))
        ));
    }

    #[test]
    fn test_update_missing_still_reports() {
        let mut store = CartStore::load(MemoryStorage::new(), KEY);
        assert!(!store.update_quantity(&ProductId::new("nope"), 3));
        assert!(!store.remove(&ProductId::new("nope")));
    }
}
