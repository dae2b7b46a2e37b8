//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem};
pub use email::{Email, EmailError};
pub use id::ProductId;
pub use price::Price;
pub use product::{Product, Rating};
