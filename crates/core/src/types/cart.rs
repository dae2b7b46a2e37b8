//! Shopping cart state.
//!
//! [`Cart`] is the pure, in-memory half of the cart: an ordered list of
//! [`CartItem`]s with at most one item per product identifier. Persistence is
//! layered on top by the storefront's cart store.
//!
//! The cart serializes as a JSON array of `{ "product": ..., "quantity": n }`
//! objects. Deserialization normalizes the list, so a hand-edited or partially
//! corrupted slot still yields a cart that satisfies the invariants.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// A product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product being purchased.
    pub product: Product,
    /// Quantity, always at least one while the item is in a cart.
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// An ordered cart keyed by product identifier.
///
/// ## Examples
///
/// ```
/// use cornershop_core::{Cart, Price, Product};
/// use rust_decimal::Decimal;
///
/// let mug = Product::new("mug", "Mug", Price::new(Decimal::new(1999, 2)));
///
/// let mut cart = Cart::new();
/// cart.add(mug.clone(), 1);
/// cart.add(mug, 2);
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.item_count(), 3);
/// assert_eq!(cart.subtotal().to_string(), "59.97");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw items, enforcing the cart invariants.
    ///
    /// Items with a zero quantity are dropped and repeated product identifiers
    /// are merged into the first occurrence by summing quantities.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item.product, item.quantity);
        }
        cart
    }

    /// Add `quantity` of `product`.
    ///
    /// If the product is already in the cart its quantity grows (saturating at
    /// `u32::MAX`); otherwise a new item is appended. Adding zero is a no-op.
    pub fn add(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.position(&product.id) {
            Some(index) => {
                if let Some(item) = self.items.get_mut(index) {
                    item.quantity = item.quantity.saturating_add(quantity);
                }
            }
            None => self.items.push(CartItem { product, quantity }),
        }
    }

    /// Set the quantity of the item for `product_id`.
    ///
    /// A quantity of zero or less removes the item. Returns `false` if the
    /// product is not in the cart, in which case nothing changes.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };

        if quantity <= 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        true
    }

    /// Remove the item for `product_id` regardless of its quantity.
    ///
    /// Returns `false` if the product was not in the cart.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product.id != product_id);
        self.items.len() != before
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of unit price times quantity over all items.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the item for `product_id`.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    /// Returns `true` if the cart holds an item for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product.id == product_id)
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
