//! Command implementations, one module per view.

pub mod auth;
pub mod listings;
pub mod prices;
pub mod search;
pub mod trends;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::app::App;
use crate::cli::Command;

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login(args) => auth::login(app, args).await,
        Command::Logout(args) => auth::logout(app, args),
        Command::Trends(args) => trends::run(app, args).await,
        Command::Listings(args) => listings::run(app, args).await,
        Command::Search(args) => search::run(app, args).await,
        Command::Prices(args) => prices::run(app, args).await,
    }
}

/// Table with the shared look of every view
pub(crate) fn new_table<S: ToString>(header: &[S]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The 1-based `page` of `items` and the total page count.
/// Pages past the end clamp to the last page.
pub(crate) fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], usize, usize) {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    (&items[start..end], page, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=50).collect();

        let (page, number, total) = paginate(&items, 1, 24);
        assert_eq!(page.len(), 24);
        assert_eq!((number, total), (1, 3));

        let (page, number, _) = paginate(&items, 3, 24);
        assert_eq!(page, &[49, 50]);
        assert_eq!(number, 3);

        let (page, number, _) = paginate(&items, 99, 24);
        assert_eq!(page, &[49, 50]);
        assert_eq!(number, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let (page, number, total) = paginate(&items, 1, 24);
        assert!(page.is_empty());
        assert_eq!((number, total), (1, 1));
    }
}
