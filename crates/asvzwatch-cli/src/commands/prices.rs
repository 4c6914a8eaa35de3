//! Price history view.

use anyhow::Result;
use clap::Parser;

use asvzwatch_core::utils::{format_datetime, format_price};

use crate::app::App;

use super::{new_table, print_json};

#[derive(Debug, Parser)]
pub struct Args {
    /// Listing id, e.g. 511325
    pub asvz_id: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

fn format_change(change: Option<f64>) -> String {
    match change {
        None => "-".to_string(),
        Some(delta) if delta > 0.0 => format!("+{}", format_price(delta)),
        Some(delta) => format_price(delta),
    }
}

pub async fn run(app: &mut App, args: Args) -> Result<()> {
    app.ensure_authenticated()?;

    let history = app.client.fetch_price_history(&args.asvz_id).await?;

    if args.json {
        return print_json(&history);
    }

    match history.title {
        Some(ref title) => println!("{} ({})", title, args.asvz_id),
        None => println!("Listing {} not found", args.asvz_id),
    }

    if history.is_empty() {
        println!("No price history");
        return Ok(());
    }

    let mut table = new_table(&["Date", "Price", "Change", "Source"]);
    for (point, change) in history.points.iter().zip(history.changes()) {
        let source = match point.id.as_str() {
            "current" => "current listing",
            "final" => "final (deleted)",
            _ => "scrape",
        };
        table.add_row(vec![
            format_datetime(&point.timestamp),
            format_price(point.price),
            format_change(change),
            source.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}
