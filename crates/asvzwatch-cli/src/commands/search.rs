//! Search view.

use anyhow::Result;
use clap::Parser;

use asvzwatch_core::api::dataset::MIN_SEARCH_LENGTH;
use asvzwatch_core::models::SearchField;
use asvzwatch_core::utils::{format_datetime, format_price, truncate};

use crate::app::App;

use super::{new_table, print_json};

/// Title column width
const TITLE_WIDTH: usize = 40;

#[derive(Debug, Parser)]
pub struct Args {
    /// Text to look for
    pub query: String,

    /// Column to match: title, id, user or all
    #[arg(long, default_value_t = SearchField::Title)]
    pub field: SearchField,

    /// Include listings that were removed from the marketplace
    #[arg(long)]
    pub deleted: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &mut App, args: Args) -> Result<()> {
    if args.query.chars().count() < MIN_SEARCH_LENGTH {
        eprintln!("Enter at least {} characters to search", MIN_SEARCH_LENGTH);
        return Ok(());
    }

    app.ensure_authenticated()?;

    let results = app
        .client
        .search_items(&args.query, args.deleted, args.field)
        .await?;

    if args.json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No listings match \"{}\"", args.query);
        return Ok(());
    }

    let mut table = new_table(&[
        "Status",
        "ID",
        "Title",
        "Price",
        "User",
        "Listed",
        "Last available",
        "Online",
    ]);

    for listing in &results {
        let item = &listing.item;
        let (last_available, online) = match listing.removal {
            Some(ref removal) => (
                removal
                    .last_available
                    .as_deref()
                    .map(format_datetime)
                    .unwrap_or_else(|| "-".to_string()),
                removal.duration_online.clone(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };

        table.add_row(vec![
            listing.status_label().to_string(),
            item.asvz_id.clone(),
            truncate(&item.title, TITLE_WIDTH),
            item.price.map(format_price).unwrap_or_else(|| "-".to_string()),
            item.user.clone(),
            format_datetime(&item.timestamp),
            last_available,
            online,
        ]);
    }

    println!("{table}");

    let deleted = results.iter().filter(|l| l.is_deleted()).count();
    println!("{} results ({} deleted)", results.len(), deleted);
    Ok(())
}
