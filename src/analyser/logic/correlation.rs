//! Pairwise correlation between numeric columns.
//!
//! Each pair uses the rows where both columns have a value. Coefficients are
//! computed for the upper triangle and mirrored, so the matrix is symmetric
//! whatever the floating point order would otherwise produce. Pairs without a
//! defined coefficient (too few complete rows, a constant side) are left out
//! of the matrix rather than reported as NaN.

use super::types::{
    CorrelationMethod, CorrelationResult, CorrelationStrength, SignificantPair, SkippedFilter,
    StructureAnalysis,
};
use super::values;
use crate::config::CorrelationPolicy;
use anyhow::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let x = Float64Chunked::from_slice("x".into(), x);
    let y = Float64Chunked::from_slice("y".into(), y);
    // NaN when either side is constant.
    let r = polars::prelude::cov::pearson_corr(&x, &y)?;
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// 1-based ranks; ties share the average of the positions they span.
pub fn average_ranks(values: &[f64]) -> PolarsResult<Vec<f64>> {
    let options = RankOptions {
        method: RankMethod::Average,
        descending: false,
    };
    let ranks = Series::new("values".into(), values).rank(options, None);
    Ok(ranks.f64()?.into_no_null_iter().collect())
}

pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    pearson(&average_ranks(x).ok()?, &average_ranks(y).ok()?)
}

/// Kendall's tau-b, which corrects for ties on either side.
pub fn kendall(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (mut concordant, mut discordant) = (0_i64, 0_i64);
    let (mut ties_x_only, mut ties_y_only) = (0_i64, 0_i64);
    for (i, (xi, yi)) in x.iter().zip(y).enumerate() {
        for (xj, yj) in x.iter().zip(y).skip(i + 1) {
            let dx = xi.total_cmp(xj) as i8;
            let dy = yi.total_cmp(yj) as i8;
            match (dx, dy) {
                (0, 0) => {}
                (0, _) => ties_x_only += 1,
                (_, 0) => ties_y_only += 1,
                _ if dx == dy => concordant += 1,
                _ => discordant += 1,
            }
        }
    }
    let untied_x = (concordant + discordant + ties_y_only) as f64;
    let untied_y = (concordant + discordant + ties_x_only) as f64;
    let denom = (untied_x * untied_y).sqrt();
    if denom <= 0.0 {
        return None;
    }
    let tau = (concordant - discordant) as f64 / denom;
    tau.is_finite().then(|| tau.clamp(-1.0, 1.0))
}

pub fn coefficient(method: CorrelationMethod, x: &[f64], y: &[f64]) -> Option<f64> {
    match method {
        CorrelationMethod::Pearson => pearson(x, y),
        CorrelationMethod::Spearman => spearman(x, y),
        CorrelationMethod::Kendall => kendall(x, y),
    }
}

/// Rows where both sides are present.
pub fn complete_pairs(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

pub fn strength(policy: &CorrelationPolicy, r: f64) -> CorrelationStrength {
    let magnitude = r.abs();
    if magnitude > policy.strong_above {
        CorrelationStrength::Strong
    } else if magnitude > policy.moderate_above {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Weak
    }
}

/// Correlates every numeric column of the filtered table that still has at
/// least two distinct values.
pub fn correlate(
    filtered: &DataFrame,
    structure: &StructureAnalysis,
    method: CorrelationMethod,
    policy: &CorrelationPolicy,
    skipped_filters: Vec<SkippedFilter>,
) -> Result<CorrelationResult> {
    let mut participants: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for profile in structure.numeric_columns() {
        let Ok(col) = filtered.column(&profile.name) else {
            continue;
        };
        let numbers = values::numeric_values(col)?;
        if values::distinct_numbers(&numbers)? >= 2 {
            participants.push((profile.name.clone(), numbers));
        }
    }

    let mut matrix: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut significant_pairs = Vec::new();

    for (i, (name_a, a)) in participants.iter().enumerate() {
        // The diagonal goes through the same estimator as every other cell.
        let own: Vec<f64> = a.iter().flatten().copied().collect();
        if let Some(r) = coefficient(method, &own, &own) {
            matrix
                .entry(name_a.clone())
                .or_default()
                .insert(name_a.clone(), r);
        }

        for (name_b, b) in participants.iter().skip(i + 1) {
            let (x, y) = complete_pairs(a, b);
            let Some(r) = coefficient(method, &x, &y) else {
                continue;
            };
            matrix
                .entry(name_a.clone())
                .or_default()
                .insert(name_b.clone(), r);
            matrix
                .entry(name_b.clone())
                .or_default()
                .insert(name_a.clone(), r);

            if r.abs() > policy.significance_threshold {
                significant_pairs.push(SignificantPair {
                    var1: name_a.clone(),
                    var2: name_b.clone(),
                    correlation: r,
                    strength: strength(policy, r),
                });
            }
        }
    }

    significant_pairs.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));

    tracing::debug!(
        method = method.as_str(),
        columns = participants.len(),
        significant = significant_pairs.len(),
        "computed correlations"
    );

    Ok(CorrelationResult {
        success: true,
        method,
        filtered_records: filtered.height(),
        columns: participants.into_iter().map(|(name, _)| name).collect(),
        matrix,
        significant_pairs,
        skipped_filters,
    })
}
