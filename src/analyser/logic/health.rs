//! Data-quality report for a loaded table.

use super::cleaning::first_occurrence_mask;
use super::profiling::{round2, summarize_labels, summarize_numbers};
use super::types::{ColumnKind, StructureAnalysis};
use super::values;
use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub rows: usize,
    pub columns: usize,
    pub estimated_size_mb: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissingValues {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRows {
    pub count: usize,
    pub percentage: f64,
}

/// Values outside `[q25 - 1.5 IQR, q75 + 1.5 IQR]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub count: usize,
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassBalance {
    pub counts: BTreeMap<String, usize>,
    pub percentages: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub basic_stats: BasicStats,
    /// Only columns with at least one missing cell.
    pub missing_values: BTreeMap<String, MissingValues>,
    pub duplicates: DuplicateRows,
    pub outliers: BTreeMap<String, OutlierSummary>,
    pub class_balance: BTreeMap<String, ClassBalance>,
    pub type_breakdown: BTreeMap<ColumnKind, Vec<String>>,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / whole as f64)
    }
}

pub fn detect_outliers(name: &str, numbers: &[Option<f64>]) -> Result<Option<OutlierSummary>> {
    let summary = summarize_numbers(name, numbers.to_vec(), 1)?;
    let (Some(q25), Some(q75)) = (summary.q25, summary.q75) else {
        return Ok(None);
    };
    let iqr = q75 - q25;
    let lower_bound = q25 - 1.5 * iqr;
    let upper_bound = q75 + 1.5 * iqr;
    let count = numbers
        .iter()
        .flatten()
        .filter(|v| **v < lower_bound || **v > upper_bound)
        .count();
    Ok(Some(OutlierSummary {
        count,
        percentage: pct(count, summary.count),
        lower_bound,
        upper_bound,
    }))
}

pub fn quality_report(df: &DataFrame, structure: &StructureAnalysis) -> Result<QualityReport> {
    let rows = df.height();

    let missing_values = structure
        .column_profiles
        .iter()
        .filter(|p| p.missing_count > 0)
        .map(|p| {
            (
                p.name.clone(),
                MissingValues {
                    count: p.missing_count,
                    percentage: round2(p.missing_pct()),
                },
            )
        })
        .collect();

    let unique_rows = first_occurrence_mask(df)?
        .into_iter()
        .filter(|keep| *keep == Some(true))
        .count();
    let duplicate_count = rows.saturating_sub(unique_rows);

    let mut outliers = BTreeMap::new();
    let mut class_balance = BTreeMap::new();
    for profile in &structure.column_profiles {
        let Ok(col) = df.column(&profile.name) else {
            continue;
        };
        if profile.detected_type.is_numeric() {
            if let Some(summary) = detect_outliers(&profile.name, &values::numeric_values(col)?)? {
                outliers.insert(profile.name.clone(), summary);
            }
        } else if profile.detected_type.is_categorical_like() {
            let summary = summarize_labels(&values::normalized_values(col)?, None)?;
            class_balance.insert(
                profile.name.clone(),
                ClassBalance {
                    counts: summary.frequency,
                    percentages: summary.percentages,
                },
            );
        }
    }

    Ok(QualityReport {
        basic_stats: BasicStats {
            rows,
            columns: df.width(),
            estimated_size_mb: round2(df.estimated_size() as f64 / (1024.0 * 1024.0)),
        },
        missing_values,
        duplicates: DuplicateRows {
            count: duplicate_count,
            percentage: pct(duplicate_count, rows),
        },
        outliers,
        class_balance,
        type_breakdown: structure.type_breakdown(),
    })
}
