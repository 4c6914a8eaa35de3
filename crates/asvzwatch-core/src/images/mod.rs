//! Thumbnail URL cache for listing pages.
//!
//! `ImageCache` maps an `asvz_id` to a resolved image URL or a recorded
//! miss, and is persisted through a `DurableStore` so revisiting pages is
//! instant across restarts. Entries are write-once: a known id is never
//! fetched again or overwritten for the lifetime of the process.
//!
//! `PageImages` is the per-view side: it asks the cache for the ids on the
//! visible page and issues at most one batched lookup for the unknown ones.
//! Results that arrive after the view moved to another page still fill the
//! cache but leave the view alone.

pub mod cache;
pub mod loader;
pub mod source;

pub use cache::{ImageCache, ImageEntry, ImageMap, STORAGE_KEY};
pub use loader::{BatchTicket, PageImages};
pub use source::{lookup_batch, ImageSource, ResolvedImage};
