use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic type assigned to a column by the classifier.
#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    NumericContinuous,
    NumericDiscrete,
    Categorical,
    Binary,
    Date,
    Text,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ColumnKind {
    pub const ALL: [Self; 6] = [
        Self::NumericContinuous,
        Self::NumericDiscrete,
        Self::Categorical,
        Self::Binary,
        Self::Date,
        Self::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumericContinuous => "numeric_continuous",
            Self::NumericDiscrete => "numeric_discrete",
            Self::Categorical => "categorical",
            Self::Binary => "binary",
            Self::Date => "date",
            Self::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::NumericContinuous | Self::NumericDiscrete)
    }

    /// Kinds summarised as value frequencies.
    pub fn is_categorical_like(&self) -> bool {
        matches!(self, Self::Categorical | Self::Binary)
    }
}

/// Which classification rule produced a profile's type.
#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    AllMissing,
    DateParse,
    NumericParse,
    TwoDistinctValues,
    LowCardinality,
    TextFallback,
    Unreadable,
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug)]
pub struct ColumnProfile {
    pub name: String,
    pub detected_type: ColumnKind,
    pub row_count: usize,
    pub distinct_count: usize,
    pub missing_count: usize,
    pub sample_values: Vec<String>,
    pub confidence: f64,
    pub rule: ClassificationRule,
}

impl ColumnProfile {
    pub fn missing_pct(&self) -> f64 {
        if self.row_count == 0 {
            0.0
        } else {
            (self.missing_count as f64 / self.row_count as f64) * 100.0
        }
    }
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug, Default)]
pub struct StructureAnalysis {
    pub row_count: usize,
    pub column_profiles: Vec<ColumnProfile>,
}

impl StructureAnalysis {
    pub fn profile(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|p| p.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.profile(name).map(|p| p.detected_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profile(name).is_some()
    }

    /// Profiles of one kind, in table order.
    pub fn columns_of(&self, kind: ColumnKind) -> impl Iterator<Item = &ColumnProfile> {
        self.column_profiles
            .iter()
            .filter(move |p| p.detected_type == kind)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.column_profiles
            .iter()
            .filter(|p| p.detected_type.is_numeric())
    }

    pub fn type_breakdown(&self) -> BTreeMap<ColumnKind, Vec<String>> {
        let mut breakdown: BTreeMap<ColumnKind, Vec<String>> = BTreeMap::new();
        for profile in &self.column_profiles {
            breakdown
                .entry(profile.detected_type)
                .or_default()
                .push(profile.name.clone());
        }
        breakdown
    }
}

/// Row-inclusion criteria for one request.
///
/// Equality filters match by prefix of the string-cast value, so `"3"` selects
/// `3A`, `3B` and `3C` alike.
#[derive(Clone, Deserialize, Serialize, PartialEq, Debug, Default)]
#[serde(default)]
pub struct FilterSpec {
    pub numeric_ranges: BTreeMap<String, (f64, f64)>,
    pub equality_filters: BTreeMap<String, String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_range(mut self, column: impl Into<String>, min: f64, max: f64) -> Self {
        self.numeric_ranges.insert(column.into(), (min, max));
        self
    }

    #[must_use]
    pub fn with_equals(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.equality_filters.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.numeric_ranges.is_empty() && self.equality_filters.is_empty()
    }

    pub fn clause_count(&self) -> usize {
        self.numeric_ranges.len() + self.equality_filters.len()
    }
}

/// A filter clause that was not applied, and why.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct SkippedFilter {
    pub column: String,
    pub reason: String,
}

/// Equal-width histogram bin, `[lower, upper)` except the last which is closed.
#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Debug)]
pub struct DistributionBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug, Default)]
pub struct NumericSummary {
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q25: Option<f64>,
    pub q75: Option<f64>,
    pub distribution_buckets: Vec<DistributionBucket>,
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug, Default)]
pub struct CategoricalSummary {
    /// Non-missing values.
    pub count: usize,
    pub missing: usize,
    pub distinct_count: usize,
    pub frequency: BTreeMap<String, usize>,
    /// Share of `count`, rounded to two decimals.
    pub percentages: BTreeMap<String, f64>,
    /// Values dropped from `frequency` by the category limit.
    pub other_count: usize,
}

impl CategoricalSummary {
    /// Frequencies sorted by descending count, ties by value.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .frequency
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug, Default)]
pub struct SummaryStatistics {
    pub success: bool,
    /// Rows in the loaded table.
    pub total_records: usize,
    /// Rows left after filtering.
    pub filtered_records: usize,
    pub numeric_stats: BTreeMap<String, NumericSummary>,
    pub categorical_stats: BTreeMap<String, CategoricalSummary>,
    pub skipped_filters: Vec<SkippedFilter>,
}

impl SummaryStatistics {
    /// True when filters matched nothing; an informational state, not an error.
    pub fn is_empty_result(&self) -> bool {
        self.filtered_records == 0
    }
}

#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        }
    }
}

impl std::fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CorrelationMethod {
    type Err = crate::error::DatalensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            "kendall" => Ok(Self::Kendall),
            other => Err(crate::error::DatalensError::InvalidArgument(format!(
                "unknown correlation method '{other}' (expected pearson, spearman or kendall)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug)]
pub struct SignificantPair {
    pub var1: String,
    pub var2: String,
    pub correlation: f64,
    pub strength: CorrelationStrength,
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Debug, Default)]
pub struct CorrelationResult {
    pub success: bool,
    pub method: CorrelationMethod,
    pub filtered_records: usize,
    /// Participating columns in table order.
    pub columns: Vec<String>,
    pub matrix: BTreeMap<String, BTreeMap<String, f64>>,
    pub significant_pairs: Vec<SignificantPair>,
    pub skipped_filters: Vec<SkippedFilter>,
}

impl CorrelationResult {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.matrix.get(a).and_then(|row| row.get(b)).copied()
    }
}

#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Pie,
    Bar,
    Histogram,
    Box,
    Scatter,
    Heatmap,
    Line,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pie => "pie",
            Self::Bar => "bar",
            Self::Histogram => "histogram",
            Self::Box => "box",
            Self::Scatter => "scatter",
            Self::Heatmap => "heatmap",
            Self::Line => "line",
        }
    }
}

#[derive(Clone, Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct VisualizationConfig {
    pub chart_type: ChartType,
    pub variables: Vec<String>,
    pub title: String,
    pub description: String,
    /// True when the chart involves one of the key columns.
    pub key: bool,
}
