//! Turning a chart recommendation plus whatever data is at hand into drawable
//! primitives.
//!
//! Raw rows give the chart the recommender asked for. With only summaries,
//! most charts fall back to an approximation built from them and are marked
//! [`Fidelity::Degraded`]. When nothing sensible can be drawn, [`render`]
//! returns `None`; it never fails.

use super::profiling;
use super::types::{
    ChartType, ColumnKind, CorrelationResult, DistributionBucket, NumericSummary,
    StructureAnalysis, SummaryStatistics, VisualizationConfig,
};
use super::values;
use crate::config::StatisticsSettings;
use crate::error::{DatalensError, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row-level values of one column, typed by its detected kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum RawColumn {
    Numeric(Vec<Option<f64>>),
    Dates(Vec<Option<NaiveDateTime>>),
    Labels(Vec<Option<String>>),
}

impl RawColumn {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Dates(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn numbers(&self) -> Option<&[Option<f64>]> {
        match self {
            Self::Numeric(v) => Some(v.as_slice()),
            Self::Dates(_) | Self::Labels(_) => None,
        }
    }

    fn labels(&self) -> Vec<Option<String>> {
        match self {
            Self::Numeric(v) => v.iter().map(|n| n.map(|n| n.to_string())).collect(),
            Self::Dates(v) => v.iter().map(|d| d.map(|d| d.to_string())).collect(),
            Self::Labels(v) => v.clone(),
        }
    }
}

/// Aligned row values for the variables of one chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub row_count: usize,
    pub columns: BTreeMap<String, RawColumn>,
}

impl RawSeries {
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.get(name)
    }
}

/// Pulls the requested columns out of a (filtered) table.
///
/// # Errors
///
/// [`DatalensError::UnknownColumn`] when a variable is not part of the
/// analysed structure or the table.
pub fn extract_raw_series(
    df: &DataFrame,
    structure: &StructureAnalysis,
    variables: &[String],
) -> Result<RawSeries> {
    let mut columns = BTreeMap::new();
    for name in variables {
        let kind = structure
            .kind_of(name)
            .ok_or_else(|| DatalensError::UnknownColumn(name.clone()))?;
        let col = df
            .column(name)
            .map_err(|_| DatalensError::UnknownColumn(name.clone()))?;
        let raw = match kind {
            ColumnKind::NumericContinuous | ColumnKind::NumericDiscrete => {
                RawColumn::Numeric(values::numeric_values(col)?)
            }
            ColumnKind::Date => RawColumn::Dates(
                values::string_values(col)?
                    .into_iter()
                    .map(|v| v.and_then(|s| values::parse_date(&s)))
                    .collect(),
            ),
            ColumnKind::Categorical | ColumnKind::Binary | ColumnKind::Text => {
                RawColumn::Labels(values::normalized_values(col)?)
            }
        };
        columns.insert(name.clone(), raw);
    }
    Ok(RawSeries {
        row_count: df.height(),
        columns,
    })
}

/// Data handed to the renderer alongside a recommendation.
#[derive(Clone, Copy, Debug)]
pub enum ChartPayload<'a> {
    Raw(&'a RawSeries),
    Summary(&'a SummaryStatistics),
    Correlation(&'a CorrelationResult),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    Ideal,
    Degraded,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", rename_all = "snake_case")]
pub enum ChartPrimitive {
    Pie {
        slices: Vec<(String, usize)>,
    },
    Bar {
        categories: Vec<String>,
        values: Vec<f64>,
    },
    /// One group per statistic, one series per variable.
    GroupedBar {
        groups: Vec<String>,
        series: Vec<(String, Vec<f64>)>,
    },
    Histogram {
        buckets: Vec<DistributionBucket>,
    },
    Box {
        variable: String,
        stats: BoxStats,
    },
    Scatter {
        x: String,
        y: String,
        points: Vec<(f64, f64)>,
    },
    Line {
        x: String,
        y: String,
        points: Vec<(NaiveDateTime, f64)>,
    },
    Heatmap {
        labels: Vec<String>,
        cells: Vec<Vec<Option<f64>>>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedChart {
    pub title: String,
    pub description: String,
    pub fidelity: Fidelity,
    pub primitive: ChartPrimitive,
}

fn count_labels(labels: &[Option<String>]) -> Option<Vec<(String, usize)>> {
    let ranked = values::label_counts(labels).ok()?;
    (!ranked.is_empty()).then_some(ranked)
}

fn bucket_bar(buckets: &[DistributionBucket]) -> Option<ChartPrimitive> {
    if buckets.is_empty() {
        return None;
    }
    Some(ChartPrimitive::Bar {
        categories: buckets
            .iter()
            .map(|b| format!("{:.2}-{:.2}", b.lower, b.upper))
            .collect(),
        values: buckets.iter().map(|b| b.count as f64).collect(),
    })
}

fn raw_buckets(
    name: &str,
    numbers: &[Option<f64>],
    bucket_count: usize,
) -> Option<Vec<DistributionBucket>> {
    let summary = profiling::summarize_numbers(name, numbers.to_vec(), bucket_count).ok()?;
    (!summary.distribution_buckets.is_empty()).then_some(summary.distribution_buckets)
}

fn box_from_summary(summary: &NumericSummary) -> Option<BoxStats> {
    Some(BoxStats {
        min: summary.min?,
        q25: summary.q25?,
        median: summary.median?,
        q75: summary.q75?,
        max: summary.max?,
    })
}

fn first_variable(config: &VisualizationConfig) -> Option<&str> {
    config.variables.first().map(String::as_str)
}

fn render_raw(
    config: &VisualizationConfig,
    raw: &RawSeries,
    settings: &StatisticsSettings,
) -> Option<ChartPrimitive> {
    match config.chart_type {
        ChartType::Pie => {
            let column = raw.column(first_variable(config)?)?;
            let slices = count_labels(&column.labels())?;
            Some(ChartPrimitive::Pie { slices })
        }
        ChartType::Bar => {
            let name = first_variable(config)?;
            let column = raw.column(name)?;
            if let Some(numbers) = column.numbers() {
                return bucket_bar(&raw_buckets(name, numbers, settings.bucket_count)?);
            }
            let counts = count_labels(&column.labels())?;
            Some(ChartPrimitive::Bar {
                categories: counts.iter().map(|(label, _)| label.clone()).collect(),
                values: counts.iter().map(|(_, c)| *c as f64).collect(),
            })
        }
        ChartType::Histogram => {
            let name = first_variable(config)?;
            let buckets = raw_buckets(name, raw.column(name)?.numbers()?, settings.bucket_count)?;
            Some(ChartPrimitive::Histogram { buckets })
        }
        ChartType::Box => {
            let name = first_variable(config)?;
            let numbers = raw.column(name)?.numbers()?;
            let summary = profiling::summarize_numbers(name, numbers.to_vec(), 1).ok()?;
            Some(ChartPrimitive::Box {
                variable: name.to_owned(),
                stats: box_from_summary(&summary)?,
            })
        }
        ChartType::Scatter => {
            let [x, y] = config.variables.as_slice() else {
                return None;
            };
            let xs = raw.column(x)?.numbers()?;
            let ys = raw.column(y)?.numbers()?;
            let points: Vec<(f64, f64)> = xs
                .iter()
                .zip(ys)
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            (!points.is_empty()).then(|| ChartPrimitive::Scatter {
                x: x.clone(),
                y: y.clone(),
                points,
            })
        }
        ChartType::Line => {
            let [x, y] = config.variables.as_slice() else {
                return None;
            };
            let RawColumn::Dates(dates) = raw.column(x)? else {
                return None;
            };
            let ys = raw.column(y)?.numbers()?;
            let mut points: Vec<(NaiveDateTime, f64)> = dates
                .iter()
                .zip(ys)
                .filter_map(|(d, v)| Some(((*d)?, (*v)?)))
                .collect();
            points.sort_by(|a, b| a.0.cmp(&b.0));
            (!points.is_empty()).then(|| ChartPrimitive::Line {
                x: x.clone(),
                y: y.clone(),
                points,
            })
        }
        ChartType::Heatmap => None,
    }
}

fn render_summary(
    config: &VisualizationConfig,
    stats: &SummaryStatistics,
) -> Option<ChartPrimitive> {
    match config.chart_type {
        ChartType::Pie => {
            let summary = stats.categorical_stats.get(first_variable(config)?)?;
            let mut slices: Vec<(String, usize)> = summary
                .ranked()
                .into_iter()
                .map(|(label, count)| (label.to_owned(), count))
                .collect();
            // Categories cut by `max_categories` still take their share.
            if summary.other_count > 0 {
                slices.push(("Other".to_owned(), summary.other_count));
            }
            (!slices.is_empty()).then_some(ChartPrimitive::Pie { slices })
        }
        ChartType::Bar => {
            let name = first_variable(config)?;
            if let Some(numeric) = stats.numeric_stats.get(name) {
                return bucket_bar(&numeric.distribution_buckets);
            }
            let ranked = stats.categorical_stats.get(name)?.ranked();
            (!ranked.is_empty()).then(|| ChartPrimitive::Bar {
                categories: ranked.iter().map(|(label, _)| (*label).to_owned()).collect(),
                values: ranked.iter().map(|(_, c)| *c as f64).collect(),
            })
        }
        ChartType::Histogram => {
            bucket_bar(&stats.numeric_stats.get(first_variable(config)?)?.distribution_buckets)
        }
        ChartType::Box => {
            let name = first_variable(config)?;
            Some(ChartPrimitive::Box {
                variable: name.to_owned(),
                stats: box_from_summary(stats.numeric_stats.get(name)?)?,
            })
        }
        ChartType::Scatter => {
            let groups = ["min", "mean", "median", "max"];
            let series = config
                .variables
                .iter()
                .map(|name| {
                    let s = stats.numeric_stats.get(name)?;
                    Some((name.clone(), vec![s.min?, s.mean?, s.median?, s.max?]))
                })
                .collect::<Option<Vec<_>>>()?;
            (!series.is_empty()).then(|| ChartPrimitive::GroupedBar {
                groups: groups.iter().map(|g| (*g).to_owned()).collect(),
                series,
            })
        }
        ChartType::Line => {
            let value = config.variables.get(1)?;
            bucket_bar(&stats.numeric_stats.get(value)?.distribution_buckets)
        }
        ChartType::Heatmap => None,
    }
}

fn render_correlation(
    config: &VisualizationConfig,
    result: &CorrelationResult,
) -> Option<ChartPrimitive> {
    if config.chart_type != ChartType::Heatmap {
        return None;
    }
    let labels: Vec<String> = if config.variables.is_empty() {
        result.columns.clone()
    } else {
        config
            .variables
            .iter()
            .filter(|v| result.columns.contains(*v))
            .cloned()
            .collect()
    };
    if labels.len() < 2 {
        return None;
    }
    let cells = labels
        .iter()
        .map(|a| labels.iter().map(|b| result.get(a, b)).collect())
        .collect();
    Some(ChartPrimitive::Heatmap { labels, cells })
}

/// Renders `config` from `payload`, degrading to a summary-based
/// approximation when only summaries are available.
///
/// Raw histograms are bucketed with `settings.bucket_count`, the same value
/// the summaries were computed with, so both payloads draw the same bins.
pub fn render(
    config: &VisualizationConfig,
    payload: ChartPayload<'_>,
    settings: &StatisticsSettings,
) -> Option<RenderedChart> {
    let (fidelity, primitive) = match payload {
        ChartPayload::Raw(raw) => (Fidelity::Ideal, render_raw(config, raw, settings)),
        ChartPayload::Summary(stats) => (Fidelity::Degraded, render_summary(config, stats)),
        ChartPayload::Correlation(result) => (Fidelity::Ideal, render_correlation(config, result)),
    };

    let Some(primitive) = primitive else {
        tracing::debug!(
            chart = config.chart_type.as_str(),
            title = %config.title,
            "nothing to render"
        );
        return None;
    };

    Some(RenderedChart {
        title: config.title.clone(),
        description: config.description.clone(),
        fidelity,
        primitive,
    })
}
