//! Load-time normalization.
//!
//! Runs once per load, before classification: trims text cells, folds
//! boolean-like spellings onto `Yes`/`No`, turns missing-value sentinels into
//! nulls and drops exact duplicate rows (first occurrence wins).

use super::values;
use anyhow::{Context as _, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Deserialize, Serialize, PartialEq, Eq, Debug, Default)]
pub struct CleaningReport {
    pub initial_rows: usize,
    pub final_rows: usize,
    pub duplicates_removed: usize,
    /// Columns with at least one missing cell before cleaning.
    pub missing_before: BTreeMap<String, usize>,
    /// Columns with at least one missing cell after cleaning.
    pub missing_after: BTreeMap<String, usize>,
}

pub fn missing_counts(df: &DataFrame) -> BTreeMap<String, usize> {
    df.get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// Applies [`values::normalize_token`] to every cell of a text column.
/// Other dtypes are returned unchanged.
pub fn normalize_column(col: &Column) -> Result<Column> {
    if col.dtype() != &DataType::String {
        return Ok(col.clone());
    }
    let normalized = values::normalized_values(col)?;
    Ok(Series::new(col.name().clone(), normalized).into())
}

/// Boolean mask keeping the first occurrence of every distinct row.
pub fn first_occurrence_mask(df: &DataFrame) -> Result<BooleanChunked> {
    let columns = df
        .get_columns()
        .iter()
        .map(values::string_values)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::with_capacity(df.height());
    let keep: Vec<bool> = (0..df.height())
        .map(|row| {
            let key: Vec<Option<&str>> = columns
                .iter()
                .map(|c| c.get(row).and_then(|v| v.as_deref()))
                .collect();
            seen.insert(key)
        })
        .collect();

    Ok(BooleanChunked::from_slice("dedupe".into(), &keep))
}

/// Normalizes cells and drops duplicate rows.
///
/// # Errors
///
/// Fails only if a column cannot be string-cast or the table cannot be
/// rebuilt.
pub fn clean_table(df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
    let initial_rows = df.height();
    let missing_before = missing_counts(df);

    let columns = df
        .get_columns()
        .iter()
        .map(normalize_column)
        .collect::<Result<Vec<_>>>()?;
    let normalized = DataFrame::new(columns).context("Failed to rebuild normalized table")?;

    let mask = first_occurrence_mask(&normalized)?;
    let cleaned = normalized
        .filter(&mask)
        .context("Failed to drop duplicate rows")?;

    let final_rows = cleaned.height();
    let report = CleaningReport {
        initial_rows,
        final_rows,
        duplicates_removed: initial_rows - final_rows,
        missing_before,
        missing_after: missing_counts(&cleaned),
    };

    tracing::info!(
        initial_rows,
        final_rows,
        duplicates_removed = report.duplicates_removed,
        "cleaned table"
    );

    Ok((cleaned, report))
}
