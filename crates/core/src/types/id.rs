//! Product identifiers.
//!
//! Catalog records are keyed by opaque string identifiers. Records that arrive
//! without one are assigned a generated identifier so that the cart's
//! one-item-per-product invariant still holds for the session.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix used for identifiers generated on behalf of records that had none.
const GENERATED_PREFIX: &str = "fallback-";

/// A stable product identifier, unique within a catalog.
///
/// ## Examples
///
/// ```
/// use cornershop_core::ProductId;
///
/// let id = ProductId::new("sku-42");
/// assert_eq!(id.as_str(), "sku-42");
/// assert!(!id.is_generated());
///
/// let generated = ProductId::generate();
/// assert!(generated.is_generated());
/// assert_ne!(generated, ProductId::generate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create an identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random identifier for a record that arrived without one.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{GENERATED_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Returns `true` if this identifier was produced by [`ProductId::generate`].
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.0.starts_with(GENERATED_PREFIX)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
