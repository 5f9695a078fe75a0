//! Analysis configuration.
//!
//! Every threshold the engine uses is a policy choice rather than a derived
//! property of the data, so all of them live here and can be overridden from
//! a JSON file. Lookup order for the file:
//!
//! 1. `$DATALENS_CONFIG`
//! 2. `<config_dir>/datalens/config.json`
//!
//! Missing or unreadable files fall back to [`AnalysisConfig::default`].

use crate::error::{DatalensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "DATALENS_CONFIG";

/// Cut-offs used by the column classifier.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Fraction of non-missing values that must parse as dates.
    pub date_threshold: f64,
    /// Fraction of non-missing values that must parse as numbers.
    pub numeric_threshold: f64,
    /// Integral columns below this distinct/row ratio are discrete...
    pub discrete_ratio: f64,
    /// ...provided they also have at most this many distinct values.
    pub discrete_max_distinct: usize,
    pub categorical_max_distinct: usize,
    pub categorical_ratio: f64,
    /// Number of example values kept on each profile.
    pub sample_size: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            date_threshold: 0.8,
            numeric_threshold: 0.8,
            discrete_ratio: 0.05,
            discrete_max_distinct: 20,
            categorical_max_distinct: 50,
            categorical_ratio: 0.05,
            sample_size: 5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StatisticsSettings {
    /// Number of equal-width distribution buckets per numeric column.
    pub bucket_count: usize,
    /// Keep only the most frequent values in categorical summaries.
    pub max_categories: Option<usize>,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            bucket_count: 10,
            max_categories: Some(10),
        }
    }
}

/// Significance threshold and strength bands for correlation pairs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CorrelationPolicy {
    /// Pairs with `|r|` strictly above this are reported.
    pub significance_threshold: f64,
    /// `|r|` above this is at least moderate.
    pub moderate_above: f64,
    /// `|r|` above this is strong.
    pub strong_above: f64,
}

impl Default for CorrelationPolicy {
    fn default() -> Self {
        Self {
            significance_threshold: 0.3,
            moderate_above: 0.5,
            strong_above: 0.7,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RecommenderSettings {
    /// Categorical columns with more distinct values get a bar chart instead of a pie.
    pub pie_max_categories: usize,
    pub max_scatter_pairs: usize,
    pub max_line_charts: usize,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            pie_max_categories: 6,
            max_scatter_pairs: 3,
            max_line_charts: 3,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub classifier: ClassifierThresholds,
    pub statistics: StatisticsSettings,
    pub correlation: CorrelationPolicy,
    pub recommender: RecommenderSettings,
    /// Default number of rows returned by a preview.
    pub preview_row_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierThresholds::default(),
            statistics: StatisticsSettings::default(),
            correlation: CorrelationPolicy::default(),
            recommender: RecommenderSettings::default(),
            preview_row_limit: 10,
        }
    }
}

impl AnalysisConfig {
    /// Rejects settings the engines cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`DatalensError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("classifier.date_threshold", self.classifier.date_threshold),
            ("classifier.numeric_threshold", self.classifier.numeric_threshold),
            ("classifier.discrete_ratio", self.classifier.discrete_ratio),
            ("classifier.categorical_ratio", self.classifier.categorical_ratio),
            (
                "correlation.significance_threshold",
                self.correlation.significance_threshold,
            ),
            ("correlation.moderate_above", self.correlation.moderate_above),
            ("correlation.strong_above", self.correlation.strong_above),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(DatalensError::Config(format!(
                    "{name} must be between 0 and 1 (got {value})"
                )));
            }
        }

        let policy = &self.correlation;
        if !(policy.significance_threshold <= policy.moderate_above
            && policy.moderate_above <= policy.strong_above)
        {
            return Err(DatalensError::Config(
                "correlation bands must satisfy significance <= moderate <= strong".to_owned(),
            ));
        }

        if self.statistics.bucket_count == 0 {
            return Err(DatalensError::Config(
                "statistics.bucket_count must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }
}

pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("datalens")
        .join("config.json")
}

/// Reads a config file, falling back to defaults when it is absent or invalid.
pub fn load_config_from(path: &Path) -> AnalysisConfig {
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
    {
        match serde_json::from_str::<AnalysisConfig>(&content) {
            Ok(config) => match config.validate() {
                Ok(()) => return config,
                Err(e) => tracing::warn!("Ignoring {}: {e}", path.display()),
            },
            Err(e) => tracing::warn!("Ignoring unparseable config {}: {e}", path.display()),
        }
    }

    AnalysisConfig::default()
}

pub fn load_app_config() -> AnalysisConfig {
    load_config_from(&get_config_path())
}

/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn save_config(config: &AnalysisConfig, path: &Path) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
