//! Cell-level parsing shared by the classifier, the filter engine and the
//! statistics engines.
//!
//! Every engine reads columns through these helpers so that a value the
//! classifier counted as numeric is parsed identically when it is filtered,
//! summarised or correlated.

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Tokens treated as a missing value after trimming.
pub const MISSING_TOKENS: [&str; 10] = [
    "", "nan", "NaN", "NAN", "None", "null", "NULL", "N/A", "n/a", "NA",
];

const YES_TOKENS: [&str; 11] = [
    "Sí", "Si", "sí", "si", "SI", "SÍ", "YES", "yes", "Yes", "Y", "y",
];

const NO_TOKENS: [&str; 5] = ["NO", "no", "No", "N", "n"];

const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Trims a raw cell and folds boolean-like spellings onto `Yes` / `No`.
/// Returns `None` for missing-value sentinels.
pub fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        return None;
    }
    if YES_TOKENS.contains(&trimmed) {
        return Some("Yes".to_owned());
    }
    if NO_TOKENS.contains(&trimmed) {
        return Some("No".to_owned());
    }
    Some(trimmed.to_owned())
}

/// Parses a number after stripping currency symbols, percent signs, spaces and
/// thousands separators. `1.234,5` and `1,234.5` both read as 1234.5.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace() && *c != '%')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');
    let normalized = match (has_comma, has_dot) {
        (true, true) => {
            // Whichever separator comes last is the decimal point.
            let last_comma = cleaned.rfind(',').unwrap_or(0);
            let last_dot = cleaned.rfind('.').unwrap_or(0);
            if last_comma > last_dot {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (true, false) if is_thousands_grouped(&cleaned, ',') => cleaned.replace(',', ""),
        (true, false) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (true, false) => return None,
        _ => cleaned,
    };

    // Reject things like "inf" or "NaN" that f64::from_str would accept.
    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_thousands_grouped(s: &str, sep: char) -> bool {
    let unsigned = s.trim_start_matches(['-', '+']);
    let mut groups = unsigned.split(sep);
    let Some(head) = groups.next() else {
        return false;
    };
    let head_ok = (1..=3).contains(&head.len()) && head.chars().all(|c| c.is_ascii_digit());
    head_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Parses common date and datetime spellings.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    // Plain numbers are never dates.
    if s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// String-cast view of a column; nulls stay `None`.
pub fn string_values(col: &Column) -> Result<Vec<Option<String>>> {
    let cast = col
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", col.name()))?;
    let ca = cast.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_owned)).collect())
}

/// String-cast view with [`normalize_token`] applied to every cell.
pub fn normalized_values(col: &Column) -> Result<Vec<Option<String>>> {
    Ok(string_values(col)?
        .into_iter()
        .map(|v| v.and_then(|s| normalize_token(&s)))
        .collect())
}

/// Numeric view of a column; cells that do not parse are `None`.
pub fn numeric_values(col: &Column) -> Result<Vec<Option<f64>>> {
    Ok(string_values(col)?
        .into_iter()
        .map(|v| v.and_then(|s| parse_number(&s)))
        .collect())
}

/// Number of distinct non-missing labels.
pub fn distinct_labels(labels: &[Option<String>]) -> Result<usize> {
    Ok(Series::new("label".into(), labels).drop_nulls().n_unique()?)
}

/// Number of distinct non-missing numbers.
pub fn distinct_numbers(numbers: &[Option<f64>]) -> Result<usize> {
    Ok(Series::new("value".into(), numbers).drop_nulls().n_unique()?)
}

/// Non-missing labels with their counts, most common first and ties broken
/// by label.
pub fn label_counts(labels: &[Option<String>]) -> Result<Vec<(String, usize)>> {
    let series = Series::new("label".into(), labels).drop_nulls();
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let table = series
        .value_counts(true, false, "counts".into(), false)
        .context("Failed to count labels")?;
    let values = table.column("label")?.as_materialized_series().str()?;
    let counts = table
        .column("counts")?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;

    let mut ranked: Vec<(String, usize)> = values
        .into_iter()
        .zip(counts.u64()?)
        .filter_map(|(label, count)| Some((label?.to_owned(), count? as usize)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(ranked)
}
