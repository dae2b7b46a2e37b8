//! Corner Shop storefront library.
//!
//! Client-side core of the storefront: the product catalog with its fallback,
//! the derived product listing, the cart mirrored to local storage, the
//! newsletter signup and search navigation, tied together by the page
//! controller in [`page`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod listing;
pub mod newsletter;
pub mod page;
pub mod search;
pub mod state;
pub mod storage;

pub use error::{AppError, Result};
pub use page::{CatalogState, PageEvent, StorefrontPage};
pub use state::AppState;
