//! Cell-level parsing helpers: numbers with currency formatting, the date
//! layouts brokers use, and ticker normalization.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::broker_constants::QUOTE_CURRENCY_SUFFIXES;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d, %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%Y%m%d"];

/// Parses a numeric cell, tolerating `$`, thousands separators, a leading
/// `+`, accounting parentheses and scientific notation.
///
/// Returns `None` for blank or non-numeric input.
pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        negative = true;
        s = &s[1..s.len() - 1];
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '+'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    Some(if negative { -value } else { value })
}

/// Strips a trailing asset code from a numeric cell (`0.5BTC` → `0.5`).
pub(crate) fn strip_unit_suffix(raw: &str) -> &str {
    raw.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic())
}

/// Parses the timestamp layouts seen across broker exports.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_suffix(" UTC").unwrap_or(s);

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Placeholder timestamp for rows without a usable date. Sorting is stable,
/// so undated rows keep their input order ahead of dated ones.
pub(crate) fn undated() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Uppercases and drops every non-alphanumeric character.
pub fn normalize_ticker(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Recovers the base asset from a combined trading pair (`BTCUSDT` → `BTC`,
/// `eth/btc` → `ETH`). Symbols that are only a quote currency are kept.
pub fn strip_quote_suffix(pair: &str) -> String {
    let symbol = normalize_ticker(pair);
    for suffix in QUOTE_CURRENCY_SUFFIXES {
        if let Some(base) = symbol.strip_suffix(suffix) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }
    symbol
}
