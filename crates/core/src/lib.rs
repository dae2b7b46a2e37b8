//! Corner Shop Core - Shared domain types.
//!
//! This crate provides the types used across all Corner Shop components:
//! - `storefront` - Catalog loading, product listing, cart store and page state
//! - `cli` - Command-line front end over the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! HTTP clients, no storage access. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices, emails, products and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
