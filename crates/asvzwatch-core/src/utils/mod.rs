//! Utility functions for timestamp parsing and display formatting.

pub mod format;

pub use format::{
    format_date, format_datetime, format_distance_strict, format_price, format_price_compact,
    parse_timestamp, to_iso, truncate,
};
