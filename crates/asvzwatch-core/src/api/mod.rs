//! REST client module for the PocketBase backend.
//!
//! This module provides the `ApiClient` for listing, filtering and
//! fetching records from the dataset's collections, building file URLs,
//! and authenticating against the `users` auth collection.

pub mod client;
pub mod dataset;
pub mod error;
pub mod filter;

pub use client::{ApiClient, ListPage, ListQuery};
pub use error::ApiError;

/// Collection names used by the dataset.
pub mod collections {
    pub const UPDATES: &str = "asvz_updates";
    pub const PRICES: &str = "asvz_price";
    pub const MARKETPLACE: &str = "asvz_marketplace";
    pub const MARKETPLACE_DELETED: &str = "asvz_marketplace_deleted";
    pub const IMAGES: &str = "asvz_images";
    pub const USERS: &str = "users";
}
