//! Type-directed summary statistics.
//!
//! Numeric columns get moments, quantiles and a fixed number of equal-width
//! buckets; categorical and binary columns get frequency tables. Date and text
//! columns are profiled by the classifier only and never summarised here.
//!
//! Every statistic is an `Option`: a column with no values left after
//! filtering produces `None` rather than NaN.

use super::types::{
    CategoricalSummary, ColumnKind, DistributionBucket, NumericSummary, SkippedFilter,
    StructureAnalysis, SummaryStatistics,
};
use super::values;
use crate::config::StatisticsSettings;
use anyhow::{Context as _, Result};
use polars::prelude::*;
use std::collections::BTreeMap;

fn non_nan(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Summarises already-parsed numbers. `None` cells count as missing.
pub fn summarize_numbers(
    name: &str,
    numbers: Vec<Option<f64>>,
    bucket_count: usize,
) -> Result<NumericSummary> {
    let missing = numbers.iter().filter(|v| v.is_none()).count();
    let ca = Float64Chunked::from_iter_options(name.into(), numbers.into_iter());
    let count = ca.len() - ca.null_count();
    if count == 0 {
        return Ok(NumericSummary {
            missing,
            ..NumericSummary::default()
        });
    }

    let min = non_nan(ca.min());
    let max = non_nan(ca.max());
    let q25 = non_nan(
        ca.quantile(0.25, QuantileMethod::Linear)
            .context("Failed to compute lower quartile")?,
    );
    let q75 = non_nan(
        ca.quantile(0.75, QuantileMethod::Linear)
            .context("Failed to compute upper quartile")?,
    );
    let std = if count < 2 { None } else { non_nan(ca.std(1)) };

    Ok(NumericSummary {
        count,
        missing,
        mean: non_nan(ca.mean()),
        median: non_nan(ca.median()),
        std,
        min,
        max,
        q25,
        q75,
        distribution_buckets: calculate_buckets(&ca, min, max, bucket_count),
    })
}

/// Equal-width buckets spanning `[min, max]`; the maximum lands in the last
/// bucket. A zero-range column gets unit-width buckets centred on its value
/// with every observation in the middle one.
pub fn calculate_buckets(
    ca: &Float64Chunked,
    min: Option<f64>,
    max: Option<f64>,
    bucket_count: usize,
) -> Vec<DistributionBucket> {
    let (Some(min_v), Some(max_v)) = (min, max) else {
        return Vec::new();
    };
    if bucket_count == 0 {
        return Vec::new();
    }

    let mut counts = vec![0; bucket_count];
    let (start, width) = if (max_v - min_v).abs() < f64::EPSILON {
        let middle = bucket_count / 2;
        if let Some(bucket) = counts.get_mut(middle) {
            *bucket = ca.len() - ca.null_count();
        }
        (min_v - middle as f64 - 0.5, 1.0)
    } else {
        let width = (max_v - min_v) / bucket_count as f64;
        for val in ca.into_iter().flatten() {
            let idx = ((val - min_v) / width).floor() as usize;
            if let Some(bucket) = counts.get_mut(idx.min(bucket_count - 1)) {
                *bucket += 1;
            }
        }
        (min_v, width)
    };

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| DistributionBucket {
            lower: start + i as f64 * width,
            upper: start + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Frequency table over normalized labels, truncated to the `max_categories`
/// most common values (ties broken by label).
pub fn summarize_labels(
    labels: &[Option<String>],
    max_categories: Option<usize>,
) -> Result<CategoricalSummary> {
    let ranked = values::label_counts(labels)?;
    let missing = labels.iter().filter(|l| l.is_none()).count();
    let count = labels.len() - missing;
    let distinct_count = ranked.len();

    let keep = max_categories.unwrap_or(ranked.len()).min(ranked.len());
    let other_count = ranked.iter().skip(keep).map(|(_, c)| c).sum();

    let frequency: BTreeMap<String, usize> = ranked.into_iter().take(keep).collect();
    let percentages = frequency
        .iter()
        .map(|(label, c)| (label.clone(), round2(*c as f64 * 100.0 / count as f64)))
        .collect();

    Ok(CategoricalSummary {
        count,
        missing,
        distinct_count,
        frequency,
        percentages,
        other_count,
    })
}

pub fn numeric_summary(col: &Column, settings: &StatisticsSettings) -> Result<NumericSummary> {
    summarize_numbers(
        col.name().as_str(),
        values::numeric_values(col)?,
        settings.bucket_count,
    )
}

pub fn categorical_summary(
    col: &Column,
    settings: &StatisticsSettings,
) -> Result<CategoricalSummary> {
    summarize_labels(&values::normalized_values(col)?, settings.max_categories)
}

/// Summarises the filtered table using the kinds recorded in `structure`.
///
/// `total_records` is the row count of the loaded table, reported alongside
/// the filtered count.
pub fn summarize(
    filtered: &DataFrame,
    structure: &StructureAnalysis,
    total_records: usize,
    settings: &StatisticsSettings,
    skipped_filters: Vec<SkippedFilter>,
) -> Result<SummaryStatistics> {
    let mut result = SummaryStatistics {
        success: true,
        total_records,
        filtered_records: filtered.height(),
        skipped_filters,
        ..SummaryStatistics::default()
    };
    if result.filtered_records == 0 {
        return Ok(result);
    }

    for profile in &structure.column_profiles {
        let Ok(col) = filtered.column(&profile.name) else {
            continue;
        };
        match profile.detected_type {
            ColumnKind::NumericContinuous | ColumnKind::NumericDiscrete => {
                result
                    .numeric_stats
                    .insert(profile.name.clone(), numeric_summary(col, settings)?);
            }
            ColumnKind::Categorical | ColumnKind::Binary => {
                result
                    .categorical_stats
                    .insert(profile.name.clone(), categorical_summary(col, settings)?);
            }
            ColumnKind::Date | ColumnKind::Text => {}
        }
    }

    Ok(result)
}
