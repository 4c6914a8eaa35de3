//! Data models for the ASVZ marketplace dataset.
//!
//! - `Update`: scraper run deltas and running totals
//! - `PricePoint`, `PriceHistory`: per-listing price series
//! - `MarketplaceItem`, `DeletedItem`, `Listing`: live and removed listings
//! - `ImageRecord`: thumbnail records joined to listings by `asvz_id`

pub mod image;
pub mod listing;
pub mod price;
pub mod update;

pub use image::ImageRecord;
pub use listing::{DeletedItem, Listing, MarketplaceItem, Removal, SearchField};
pub use price::{PriceHistory, PricePoint};
pub use update::Update;
