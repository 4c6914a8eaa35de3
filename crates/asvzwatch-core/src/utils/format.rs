use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const MINUTES_IN_DAY: f64 = 1440.0;
const MINUTES_IN_MONTH: f64 = 43_200.0;
const MINUTES_IN_YEAR: f64 = 525_600.0;

/// Parse the timestamp shapes seen in the dataset: RFC 3339, PocketBase's
/// space-separated `2024-05-01 10:00:00.000Z`, naive date-times (taken as
/// UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let normalized = value.replacen(' ', "T", 1);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// ISO 8601 with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`
pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Format a timestamp as `dd.MM.yyyy`, `-` when empty
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%d.%m.%Y").to_string(),
        None if value.is_empty() => "-".to_string(),
        None => value.to_string(),
    }
}

/// Format a timestamp as `dd.MM.yyyy HH:mm`, `-` when empty
pub fn format_datetime(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%d.%m.%Y %H:%M").to_string(),
        None if value.is_empty() => "-".to_string(),
        None => value.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a price in euros, e.g. `€1,234.50`
pub fn format_price(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}€{}.{}", sign, group_thousands(int_part), frac_part)
}

/// Compact euro amount for totals, e.g. `€950`, `€1.2K`, `€34K`, `€5.6M`
pub fn format_price_compact(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1.0, ""), (1e3, "K"), (1e6, "M"), (1e9, "B")];

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let round_in = |unit: usize| {
        let (factor, suffix) = UNITS[unit];
        let scaled = abs / factor;
        if scaled < 10.0 && !suffix.is_empty() {
            (scaled * 10.0).round() / 10.0
        } else {
            scaled.round()
        }
    };

    // Move up a unit when rounding reaches 1000 of the current one
    let mut unit = 0;
    let mut rounded = round_in(unit);
    while rounded >= 1000.0 && unit + 1 < UNITS.len() {
        unit += 1;
        rounded = round_in(unit);
    }

    format!("{}€{}{}", sign, rounded, UNITS[unit].1)
}

/// Distance between two instants in the largest whole unit, e.g.
/// `45 seconds`, `1 hour`, `3 days`, `2 months`
pub fn format_distance_strict(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let seconds = (to - from).num_milliseconds().abs() as f64 / 1000.0;
    let minutes = seconds / 60.0;

    let (value, unit) = if minutes < 1.0 {
        (seconds.round(), "second")
    } else if minutes < 60.0 {
        (minutes.round(), "minute")
    } else if minutes < MINUTES_IN_DAY {
        ((minutes / 60.0).round(), "hour")
    } else if minutes < MINUTES_IN_MONTH {
        ((minutes / MINUTES_IN_DAY).round(), "day")
    } else if minutes < MINUTES_IN_YEAR {
        ((minutes / MINUTES_IN_MONTH).round(), "month")
    } else {
        ((minutes / MINUTES_IN_YEAR).round(), "year")
    };

    let value = value as i64;
    if value == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
