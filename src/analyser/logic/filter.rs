//! Row filtering for analysis requests.
//!
//! Clauses are ANDed. Each one is evaluated in isolation: a clause that cannot
//! apply (unknown column, nothing numeric to compare against) is logged,
//! recorded in [`FilterOutcome::skipped`] and otherwise ignored, so one bad
//! clause never fails the request.

use super::types::{FilterSpec, SkippedFilter};
use super::values;
use crate::error::{DatalensError, Result};
use polars::prelude::*;

#[derive(Clone, Debug)]
pub struct FilterOutcome {
    pub table: DataFrame,
    pub initial_count: usize,
    pub filtered_count: usize,
    pub skipped: Vec<SkippedFilter>,
}

/// Per-row result of a single numeric range clause. Missing and unparseable
/// cells never match.
pub fn range_mask(col: &Column, min: f64, max: f64) -> Result<Vec<bool>> {
    if min.is_nan() || max.is_nan() {
        return Err(DatalensError::FilterTypeMismatch {
            column: col.name().to_string(),
            reason: "range bounds must be numbers".to_owned(),
        });
    }
    let numbers = values::numeric_values(col)?;
    if !numbers.is_empty() && numbers.iter().all(Option::is_none) {
        return Err(DatalensError::FilterTypeMismatch {
            column: col.name().to_string(),
            reason: "column has no numeric values".to_owned(),
        });
    }
    Ok(numbers
        .into_iter()
        .map(|v| v.is_some_and(|v| min <= v && v <= max))
        .collect())
}

/// Per-row result of a single equality clause: prefix match on the
/// string-cast value, so `"3"` matches `3A` and `3B` but not `4B`.
pub fn equality_mask(col: &Column, prefix: &str) -> Result<Vec<bool>> {
    let prefix = prefix.trim();
    // Cells were folded on load ("si" became "Yes"), so fold the prefix too.
    let folded = values::normalize_token(prefix);
    Ok(values::string_values(col)?
        .into_iter()
        .map(|v| {
            v.is_some_and(|v| {
                let cell = v.trim();
                cell.starts_with(prefix) || folded.as_deref().is_some_and(|f| cell.starts_with(f))
            })
        })
        .collect())
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| DatalensError::UnknownColumn(name.to_owned()))
}

fn and_into(mask: &mut [bool], clause: &[bool]) {
    for (keep, matched) in mask.iter_mut().zip(clause) {
        *keep &= *matched;
    }
}

fn skip(column: &str, err: &DatalensError) -> SkippedFilter {
    tracing::warn!("Skipping filter on '{column}': {err}");
    SkippedFilter {
        column: column.to_owned(),
        reason: err.to_string(),
    }
}

/// Applies every clause of `spec` to `df`.
///
/// # Errors
///
/// Only if the masked table cannot be materialized; clause failures are
/// reported through `skipped` instead.
pub fn apply_filters(df: &DataFrame, spec: &FilterSpec) -> Result<FilterOutcome> {
    let initial_count = df.height();
    let mut mask = vec![true; initial_count];
    let mut skipped = Vec::new();

    for (name, &(min, max)) in &spec.numeric_ranges {
        match lookup(df, name).and_then(|col| range_mask(col, min, max)) {
            Ok(clause) => and_into(&mut mask, &clause),
            Err(e) => skipped.push(skip(name, &e)),
        }
    }

    for (name, prefix) in &spec.equality_filters {
        match lookup(df, name).and_then(|col| equality_mask(col, prefix)) {
            Ok(clause) => and_into(&mut mask, &clause),
            Err(e) => skipped.push(skip(name, &e)),
        }
    }

    let table = if mask.iter().all(|keep| *keep) {
        df.clone()
    } else {
        df.filter(&BooleanChunked::from_slice("filter".into(), &mask))?
    };
    let filtered_count = table.height();

    tracing::debug!(
        initial_count,
        filtered_count,
        clauses = spec.clause_count(),
        skipped = skipped.len(),
        "applied filters"
    );

    Ok(FilterOutcome {
        table,
        initial_count,
        filtered_count,
        skipped,
    })
}

/// Same as [`apply_filters`], but a missing spec passes the table through.
pub fn apply_optional(df: &DataFrame, spec: Option<&FilterSpec>) -> Result<FilterOutcome> {
    match spec {
        Some(spec) if !spec.is_empty() => apply_filters(df, spec),
        _ => Ok(FilterOutcome {
            table: df.clone(),
            initial_count: df.height(),
            filtered_count: df.height(),
            skipped: Vec::new(),
        }),
    }
}
