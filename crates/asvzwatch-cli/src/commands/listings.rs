//! Current listings view.

use anyhow::Result;
use clap::Parser;

use asvzwatch_core::utils::{format_datetime, format_price, truncate};
use asvzwatch_core::PageImages;

use crate::app::App;

use super::{new_table, paginate};

/// Title column width
const TITLE_WIDTH: usize = 48;

#[derive(Debug, Parser)]
pub struct Args {
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Listings per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Skip thumbnail lookup
    #[arg(long)]
    pub no_images: bool,
}

pub async fn run(app: &mut App, args: Args) -> Result<()> {
    app.ensure_authenticated()?;

    if let Err(e) = app.marketplace.ensure_loaded(&app.client).await {
        if !app.marketplace.is_loaded() {
            return Err(e);
        }
        eprintln!("Showing the newest listings only: {:#}", e);
    }

    let page_size = args.page_size.unwrap_or_else(|| app.config.page_size());
    let items = app.marketplace.items();
    let (page, number, total_pages) = paginate(items, args.page, page_size);

    let mut images = PageImages::new();
    if !args.no_images {
        let ids: Vec<&str> = page.iter().map(|item| item.asvz_id.as_str()).collect();
        images.load_page(&mut app.images, &app.client, &ids).await;
    }

    let mut table = new_table(&["ID", "Title", "Price", "User", "Scraped", "Image"]);
    for item in page {
        let image = if args.no_images {
            "-".to_string()
        } else {
            images.url(&item.asvz_id).unwrap_or("no image").to_string()
        };
        table.add_row(vec![
            item.asvz_id.clone(),
            truncate(&item.title, TITLE_WIDTH),
            item.price.map(format_price).unwrap_or_else(|| "-".to_string()),
            item.user.clone(),
            format_datetime(&item.timestamp),
            image,
        ]);
    }

    println!("{table}");
    let partial = if app.marketplace.is_complete() {
        ""
    } else {
        ", partial"
    };
    println!(
        "Page {} of {} ({} listings{})",
        number,
        total_pages,
        items.len(),
        partial
    );
    Ok(())
}
