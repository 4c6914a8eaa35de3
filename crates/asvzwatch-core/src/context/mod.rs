//! State shared across views.
//!
//! - `MarketplaceContext`: live listings loaded once and kept across view
//!   switches, first page first for a quick first render

pub mod marketplace;

pub use marketplace::{ListingSource, MarketplaceContext, FIRST_PAGE_SIZE};
