//! The loaded dataset and the request surface over it.
//!
//! A load builds a complete [`DatasetSnapshot`] (cleaned table, structure
//! analysis, cleaning report) before taking the write lock, then swaps it in
//! with a single pointer replace. Requests clone the current `Arc` once and
//! work on that snapshot only, so the table and its column profiles always
//! come from the same load even when another load lands mid-request.
//!
//! ```no_run
//! use datalens::analyser::logic::{CorrelationMethod, FilterSpec};
//! use datalens::analyser::store::DatasetStore;
//!
//! # fn example() -> datalens::error::Result<()> {
//! let store = DatasetStore::default();
//! store.load_csv_path(std::path::Path::new("patients.csv"))?;
//!
//! let filter = FilterSpec::new().with_range("age", 30.0, 50.0);
//! let summary = store.get_summary(Some(&filter))?;
//! let correlations = store.get_correlations(CorrelationMethod::Spearman, Some(&filter))?;
//! println!("{} of {} rows", summary.filtered_records, summary.total_records);
//! # let _ = correlations;
//! # Ok(())
//! # }
//! ```

use super::logic::cleaning::{self, CleaningReport};
use super::logic::health::{self, QualityReport};
use super::logic::render::{self, RawSeries};
use super::logic::types::{
    CorrelationMethod, CorrelationResult, FilterSpec, StructureAnalysis, SummaryStatistics,
    VisualizationConfig,
};
use super::logic::{classify, correlation, filter, io, profiling, recommend, values};
use crate::config::AnalysisConfig;
use crate::error::{DatalensError, Result, ResultExt as _};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// One load's worth of state. Never mutated after construction.
#[derive(Debug)]
pub struct DatasetSnapshot {
    pub name: String,
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub table: DataFrame,
    pub structure: StructureAnalysis,
    pub cleaning: CleaningReport,
}

/// First rows of the table with every cell rendered as text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub total_rows: usize,
}

#[derive(Debug, Default)]
pub struct DatasetStore {
    config: AnalysisConfig,
    current: RwLock<Option<Arc<DatasetSnapshot>>>,
    next_version: AtomicU64,
}

impl DatasetStore {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
            next_version: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Cleans and classifies `table`, then makes it the current dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if cleaning fails; the previous snapshot stays current.
    pub fn load_table(
        &self,
        name: impl Into<String>,
        table: DataFrame,
    ) -> Result<Arc<DatasetSnapshot>> {
        let name = name.into();
        let (table, cleaning) = cleaning::clean_table(&table)
            .with_context(|| format!("Failed to clean dataset '{name}'"))?;
        let structure = classify::analyse_structure(&table, &self.config.classifier);

        let snapshot = Arc::new(DatasetSnapshot {
            version: self.next_version.fetch_add(1, Ordering::SeqCst) + 1,
            loaded_at: Utc::now(),
            name,
            table,
            structure,
            cleaning,
        });

        let mut current = self
            .current
            .write()
            .map_err(|e| DatalensError::Other(format!("Lock poisoned: {e}")))?;
        *current = Some(Arc::clone(&snapshot));
        drop(current);

        tracing::info!(
            dataset = %snapshot.name,
            version = snapshot.version,
            rows = snapshot.table.height(),
            columns = snapshot.structure.column_profiles.len(),
            "dataset loaded"
        );
        Ok(snapshot)
    }

    pub fn load_csv_path(&self, path: &Path) -> Result<Arc<DatasetSnapshot>> {
        let table = io::load_csv_path(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_owned();
        self.load_table(name, table)
    }

    pub fn load_csv_bytes(
        &self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Arc<DatasetSnapshot>> {
        self.load_table(name, io::load_csv_bytes(bytes)?)
    }

    /// The current snapshot.
    ///
    /// # Errors
    ///
    /// [`DatalensError::NoDataLoaded`] before the first successful load.
    pub fn snapshot(&self) -> Result<Arc<DatasetSnapshot>> {
        let current = self
            .current
            .read()
            .map_err(|e| DatalensError::Other(format!("Lock poisoned: {e}")))?;
        current.as_ref().map(Arc::clone).ok_or(DatalensError::NoDataLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_ok()
    }

    pub fn get_structure_analysis(&self) -> Result<StructureAnalysis> {
        Ok(self.snapshot()?.structure.clone())
    }

    pub fn get_summary(&self, filter: Option<&FilterSpec>) -> Result<SummaryStatistics> {
        let snapshot = self.snapshot()?;
        let outcome = filter::apply_optional(&snapshot.table, filter)?;
        tracing::info!(
            dataset = %snapshot.name,
            filtered = outcome.filtered_count,
            total = outcome.initial_count,
            "summary requested"
        );
        Ok(profiling::summarize(
            &outcome.table,
            &snapshot.structure,
            outcome.initial_count,
            &self.config.statistics,
            outcome.skipped,
        )?)
    }

    pub fn get_correlations(
        &self,
        method: CorrelationMethod,
        filter: Option<&FilterSpec>,
    ) -> Result<CorrelationResult> {
        let snapshot = self.snapshot()?;
        let outcome = filter::apply_optional(&snapshot.table, filter)?;
        tracing::info!(
            dataset = %snapshot.name,
            method = method.as_str(),
            filtered = outcome.filtered_count,
            "correlations requested"
        );
        Ok(correlation::correlate(
            &outcome.table,
            &snapshot.structure,
            method,
            &self.config.correlation,
            outcome.skipped,
        )?)
    }

    pub fn get_visualization_configs(&self) -> Result<Vec<VisualizationConfig>> {
        let snapshot = self.snapshot()?;
        Ok(recommend::recommend(
            &snapshot.structure,
            &self.config.recommender,
        ))
    }

    /// Row-level values of `variables` after filtering, for ideal rendering.
    pub fn get_raw_series(
        &self,
        variables: &[String],
        filter: Option<&FilterSpec>,
    ) -> Result<RawSeries> {
        let snapshot = self.snapshot()?;
        let outcome = filter::apply_optional(&snapshot.table, filter)?;
        render::extract_raw_series(&outcome.table, &snapshot.structure, variables)
    }

    /// First `n` rows; `None` uses the configured preview limit.
    pub fn get_preview(&self, n: Option<usize>) -> Result<Preview> {
        let snapshot = self.snapshot()?;
        let head = snapshot
            .table
            .head(Some(n.unwrap_or(self.config.preview_row_limit)));

        let columns = head
            .get_columns()
            .iter()
            .map(values::string_values)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let rows = (0..head.height())
            .map(|row| {
                columns
                    .iter()
                    .map(|col| col.get(row).cloned().flatten())
                    .collect()
            })
            .collect();

        Ok(Preview {
            columns: head
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            rows,
            total_rows: snapshot.table.height(),
        })
    }

    pub fn get_quality_report(&self) -> Result<QualityReport> {
        let snapshot = self.snapshot()?;
        Ok(health::quality_report(&snapshot.table, &snapshot.structure)?)
    }

    pub fn get_cleaning_report(&self) -> Result<CleaningReport> {
        Ok(self.snapshot()?.cleaning.clone())
    }
}
