//! Core library for asvzwatch.
//!
//! Everything the dashboard views need lives here: the PocketBase
//! collection client and the dataset queries built on it, the persisted
//! image URL cache, trend aggregation, cross-view context state, session
//! handling and formatting helpers. The views themselves live in
//! `asvzwatch-cli`.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod images;
pub mod models;
pub mod storage;
pub mod trends;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use images::{ImageCache, ImageEntry, PageImages};
pub use storage::{DurableStore, FileStore, MemoryStore};
