use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use datalens::analyser::DatasetStore;
use datalens::analyser::logic::{ChartPayload, ChartType, CorrelationMethod, FilterSpec, render};
use datalens::config;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "datalens",
    version,
    about = "Profile, filter, correlate and chart an arbitrary CSV file"
)]
pub struct Cli {
    /// Path to a JSON analysis configuration file
    #[arg(long, global = true, env = config::CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Row filters shared by the per-request subcommands.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Numeric range filter, `column=min:max` (inclusive). Repeatable.
    #[arg(long = "range", value_parser = parse_range)]
    pub ranges: Vec<(String, f64, f64)>,

    /// Prefix equality filter, `column=value`. Repeatable.
    #[arg(long = "eq", value_parser = parse_equals)]
    pub equals: Vec<(String, String)>,
}

impl FilterArgs {
    pub fn to_spec(&self) -> Option<FilterSpec> {
        let spec = self
            .ranges
            .iter()
            .fold(FilterSpec::new(), |spec, (col, min, max)| {
                spec.with_range(col.clone(), *min, *max)
            });
        let spec = self
            .equals
            .iter()
            .fold(spec, |spec, (col, value)| spec.with_equals(col.clone(), value.clone()));
        (!spec.is_empty()).then_some(spec)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every column
    Structure { file: PathBuf },
    /// Type-aware summary statistics over the filtered rows
    Summary {
        file: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Correlation matrix and significant pairs over the filtered rows
    Correlations {
        file: PathBuf,
        /// pearson, spearman or kendall
        #[arg(short, long, default_value = "pearson")]
        method: CorrelationMethod,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Recommended charts for the table
    Charts { file: PathBuf },
    /// Missing values, duplicates, outliers and class balance
    Quality { file: PathBuf },
    /// First rows of the cleaned table
    Preview {
        file: PathBuf,
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Render one recommended chart
    Render {
        file: PathBuf,
        /// Index into the list printed by `charts`
        #[arg(long)]
        chart: usize,
        /// Render from summary statistics only
        #[arg(long)]
        summary_only: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

impl Commands {
    fn file(&self) -> &PathBuf {
        match self {
            Self::Structure { file }
            | Self::Summary { file, .. }
            | Self::Correlations { file, .. }
            | Self::Charts { file }
            | Self::Quality { file }
            | Self::Preview { file, .. }
            | Self::Render { file, .. } => file,
        }
    }
}

pub fn parse_range(raw: &str) -> Result<(String, f64, f64), String> {
    let (column, bounds) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected column=min:max, got '{raw}'"))?;
    let (min, max) = bounds
        .split_once(':')
        .ok_or_else(|| format!("expected min:max, got '{bounds}'"))?;
    let min: f64 = min
        .trim()
        .parse()
        .map_err(|e| format!("invalid minimum '{min}': {e}"))?;
    let max: f64 = max
        .trim()
        .parse()
        .map_err(|e| format!("invalid maximum '{max}': {e}"))?;
    Ok((column.trim().to_owned(), min, max))
}

pub fn parse_equals(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{raw}'"))?;
    Ok((column.trim().to_owned(), value.to_owned()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run_command(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_app_config(),
    };
    let store = DatasetStore::new(config);
    let file = cli.command.file();
    store
        .load_csv_path(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    match &cli.command {
        Commands::Structure { .. } => print_json(&store.get_structure_analysis()?),
        Commands::Summary { filters, .. } => {
            print_json(&store.get_summary(filters.to_spec().as_ref())?)
        }
        Commands::Correlations {
            method, filters, ..
        } => print_json(&store.get_correlations(*method, filters.to_spec().as_ref())?),
        Commands::Charts { .. } => print_json(&store.get_visualization_configs()?),
        Commands::Quality { .. } => print_json(&store.get_quality_report()?),
        Commands::Preview { n, .. } => print_json(&store.get_preview(*n)?),
        Commands::Render {
            chart,
            summary_only,
            filters,
            ..
        } => handle_render(&store, *chart, *summary_only, filters),
    }
}

fn handle_render(
    store: &DatasetStore,
    index: usize,
    summary_only: bool,
    filters: &FilterArgs,
) -> Result<()> {
    let charts = store.get_visualization_configs()?;
    let config = charts
        .get(index)
        .with_context(|| format!("No chart at index {index} ({} available)", charts.len()))?;
    let spec = filters.to_spec();
    let settings = &store.config().statistics;

    let rendered = match config.chart_type {
        ChartType::Heatmap => {
            let correlations =
                store.get_correlations(CorrelationMethod::default(), spec.as_ref())?;
            render(config, ChartPayload::Correlation(&correlations), settings)
        }
        _ if summary_only => {
            let summary = store.get_summary(spec.as_ref())?;
            render(config, ChartPayload::Summary(&summary), settings)
        }
        _ => {
            let raw = store.get_raw_series(&config.variables, spec.as_ref())?;
            render(config, ChartPayload::Raw(&raw), settings)
        }
    };

    match rendered {
        Some(chart) => print_json(&chart),
        None => {
            tracing::warn!("Chart '{}' has nothing to draw", config.title);
            print_json(&serde_json::Value::Null)
        }
    }
}
