//! Trend aggregation for the updates view.
//!
//! Scraper runs are recorded as deltas (`added`, `updated`, `deleted`) plus
//! running totals. Daily grouping sums the deltas of each calendar day and
//! keeps the totals of the day's last run, since totals are state rather
//! than per-run amounts.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::Update;

/// Length of the `YYYY-MM-DD` prefix of an ISO timestamp.
const DAY_KEY_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// One point per scraper run
    Hourly,
    #[default]
    Daily,
}

/// One point of the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Run timestamp, or the `YYYY-MM-DD` day when grouped
    pub timestamp: String,
    pub added: i64,
    pub updated: i64,
    pub deleted: i64,
    pub total_items: i64,
    pub total_value: f64,
}

impl From<&Update> for TrendPoint {
    fn from(update: &Update) -> Self {
        Self {
            timestamp: update.timestamp.clone(),
            added: update.added,
            updated: update.updated,
            deleted: update.deleted,
            total_items: update.total_items,
            total_value: update.total_value,
        }
    }
}

/// Series that can be plotted from a `TrendPoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendField {
    Added,
    Updated,
    Deleted,
    TotalItems,
    TotalValue,
}

impl TrendField {
    pub const ALL: [TrendField; 5] = [
        TrendField::Added,
        TrendField::Updated,
        TrendField::Deleted,
        TrendField::TotalItems,
        TrendField::TotalValue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrendField::Added => "added",
            TrendField::Updated => "updated",
            TrendField::Deleted => "deleted",
            TrendField::TotalItems => "total_items",
            TrendField::TotalValue => "total_value",
        }
    }

    pub fn value(&self, point: &TrendPoint) -> f64 {
        match self {
            TrendField::Added => point.added as f64,
            TrendField::Updated => point.updated as f64,
            TrendField::Deleted => point.deleted as f64,
            TrendField::TotalItems => point.total_items as f64,
            TrendField::TotalValue => point.total_value,
        }
    }

    /// Totals are snapshots; the rest are per-run deltas.
    pub fn is_total(&self) -> bool {
        matches!(self, TrendField::TotalItems | TrendField::TotalValue)
    }
}

impl fmt::Display for TrendField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrendField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrendField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

fn day_key(timestamp: &str) -> &str {
    timestamp.get(..DAY_KEY_LEN).unwrap_or(timestamp)
}

/// Group `updates` (ascending by timestamp) according to `grouping`.
pub fn aggregate(updates: &[Update], grouping: Grouping) -> Vec<TrendPoint> {
    match grouping {
        Grouping::Hourly => updates.iter().map(TrendPoint::from).collect(),
        Grouping::Daily => group_daily(updates),
    }
}

/// Sum deltas per day; take totals from the day's last record. Days appear
/// in the order they are first seen.
pub fn group_daily(updates: &[Update]) -> Vec<TrendPoint> {
    let mut days: Vec<TrendPoint> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for update in updates {
        let day = day_key(&update.timestamp);
        let slot = *index.entry(day).or_insert_with(|| {
            days.push(TrendPoint {
                timestamp: day.to_string(),
                added: 0,
                updated: 0,
                deleted: 0,
                total_items: 0,
                total_value: 0.0,
            });
            days.len() - 1
        });

        let point = &mut days[slot];
        point.added += update.added;
        point.updated += update.updated;
        point.deleted += update.deleted;
        point.total_items = update.total_items;
        point.total_value = update.total_value;
    }

    days
}
