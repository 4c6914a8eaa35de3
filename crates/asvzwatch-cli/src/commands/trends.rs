//! Update trends view.

use anyhow::Result;
use clap::Parser;

use asvzwatch_core::trends::{aggregate, Grouping, TrendField, TrendPoint};
use asvzwatch_core::utils::{format_date, format_datetime, format_price_compact};

use crate::app::App;

use super::{new_table, print_json};

#[derive(Debug, Parser)]
pub struct Args {
    /// Start of the range (ISO date or date-time)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the range (ISO date or date-time)
    #[arg(long)]
    pub to: Option<String>,

    /// One row per scraper run instead of per day
    #[arg(long)]
    pub hourly: bool,

    /// Columns to show
    #[arg(long, value_delimiter = ',', default_values_t = TrendField::ALL)]
    pub fields: Vec<TrendField>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

fn format_value(field: TrendField, point: &TrendPoint) -> String {
    match field {
        TrendField::TotalValue => format_price_compact(point.total_value),
        other => format!("{}", other.value(point) as i64),
    }
}

pub async fn run(app: &mut App, args: Args) -> Result<()> {
    app.ensure_authenticated()?;

    let updates = app
        .client
        .fetch_updates(args.from.as_deref(), args.to.as_deref())
        .await?;

    let grouping = if args.hourly {
        Grouping::Hourly
    } else {
        Grouping::Daily
    };
    let points = aggregate(&updates, grouping);

    if args.json {
        return print_json(&points);
    }

    if points.is_empty() {
        println!("No updates in this range");
        return Ok(());
    }

    let mut header = vec!["Time".to_string()];
    header.extend(args.fields.iter().map(|f| f.name().to_string()));
    let mut table = new_table(&header);

    for point in &points {
        let time = match grouping {
            Grouping::Hourly => format_datetime(&point.timestamp),
            Grouping::Daily => format_date(&point.timestamp),
        };
        let mut row = vec![time];
        row.extend(args.fields.iter().map(|&f| format_value(f, point)));
        table.add_row(row);
    }

    println!("{table}");

    let added: i64 = points.iter().map(|p| p.added).sum();
    let deleted: i64 = points.iter().map(|p| p.deleted).sum();
    println!(
        "{} runs, {} added, {} deleted",
        updates.len(),
        added,
        deleted
    );
    Ok(())
}
