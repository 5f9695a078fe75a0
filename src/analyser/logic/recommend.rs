//! Chart recommendations derived from column kinds.
//!
//! Works from the structure analysis alone, so the list never changes with the
//! filters applied to a request.

use super::types::{ChartType, ColumnKind, ColumnProfile, StructureAnalysis, VisualizationConfig};
use crate::config::RecommenderSettings;

/// Column names that usually hold the outcome of a study or process.
pub const OUTCOME_NAME_HINTS: [&str; 8] = [
    "target",
    "outcome",
    "label",
    "class",
    "diagnosis",
    "result",
    "cancer",
    "status",
];

/// Outcome column: the only binary column when there is exactly one,
/// otherwise the first binary or categorical column whose name hints at an
/// outcome.
pub fn outcome_column(structure: &StructureAnalysis) -> Option<&ColumnProfile> {
    let mut binaries = structure.columns_of(ColumnKind::Binary);
    if let (Some(only), None) = (binaries.next(), binaries.next()) {
        return Some(only);
    }
    structure.column_profiles.iter().find(|p| {
        p.detected_type.is_categorical_like() && {
            let lower = p.name.to_lowercase();
            OUTCOME_NAME_HINTS.iter().any(|hint| lower.contains(hint))
        }
    })
}

pub fn primary_date_column(structure: &StructureAnalysis) -> Option<&ColumnProfile> {
    structure.columns_of(ColumnKind::Date).next()
}

/// Names of the columns whose charts are listed first.
pub fn key_columns(structure: &StructureAnalysis) -> Vec<String> {
    outcome_column(structure)
        .into_iter()
        .chain(primary_date_column(structure))
        .map(|p| p.name.clone())
        .collect()
}

fn chart(
    chart_type: ChartType,
    variables: &[&str],
    title: String,
    description: String,
) -> VisualizationConfig {
    VisualizationConfig {
        chart_type,
        variables: variables.iter().map(|v| (*v).to_owned()).collect(),
        title,
        description,
        key: false,
    }
}

fn single_column_charts(
    profile: &ColumnProfile,
    settings: &RecommenderSettings,
) -> Vec<VisualizationConfig> {
    if profile.distinct_count == 0 {
        return Vec::new();
    }
    let name = profile.name.as_str();
    match profile.detected_type {
        ColumnKind::Binary => vec![chart(
            ChartType::Pie,
            &[name],
            format!("Distribution of {name}"),
            format!("Share of each of the two values of {name}"),
        )],
        ColumnKind::Categorical if profile.distinct_count <= settings.pie_max_categories => {
            vec![chart(
                ChartType::Pie,
                &[name],
                format!("Distribution of {name}"),
                format!("Share of each category of {name}"),
            )]
        }
        ColumnKind::Categorical => vec![chart(
            ChartType::Bar,
            &[name],
            format!("Frequency of {name}"),
            format!("Count of records per category of {name}"),
        )],
        ColumnKind::NumericContinuous => vec![
            chart(
                ChartType::Histogram,
                &[name],
                format!("Distribution of {name}"),
                format!("Histogram of {name}"),
            ),
            chart(
                ChartType::Box,
                &[name],
                format!("Spread of {name}"),
                format!("Quartiles and range of {name}"),
            ),
        ],
        ColumnKind::NumericDiscrete => vec![chart(
            ChartType::Histogram,
            &[name],
            format!("Distribution of {name}"),
            format!("Count of records per value of {name}"),
        )],
        ColumnKind::Date | ColumnKind::Text => Vec::new(),
    }
}

/// Builds the ordered chart list.
pub fn recommend(
    structure: &StructureAnalysis,
    settings: &RecommenderSettings,
) -> Vec<VisualizationConfig> {
    let mut charts: Vec<VisualizationConfig> = structure
        .column_profiles
        .iter()
        .flat_map(|p| single_column_charts(p, settings))
        .collect();

    let continuous: Vec<&str> = structure
        .columns_of(ColumnKind::NumericContinuous)
        .map(|p| p.name.as_str())
        .collect();

    let scatter_pairs = continuous
        .iter()
        .enumerate()
        .flat_map(|(i, a)| continuous.iter().skip(i + 1).map(move |b| (*a, *b)))
        .take(settings.max_scatter_pairs);
    for (a, b) in scatter_pairs {
        charts.push(chart(
            ChartType::Scatter,
            &[a, b],
            format!("{a} vs {b}"),
            format!("Relationship between {a} and {b}"),
        ));
    }

    let numeric: Vec<&str> = structure
        .numeric_columns()
        .map(|p| p.name.as_str())
        .collect();
    if numeric.len() >= 3 {
        charts.push(chart(
            ChartType::Heatmap,
            &numeric,
            "Correlation matrix".to_owned(),
            "Pairwise correlation between numeric variables".to_owned(),
        ));
    }

    if let Some(date) = primary_date_column(structure) {
        let date = date.name.as_str();
        for &value in continuous.iter().take(settings.max_line_charts) {
            charts.push(chart(
                ChartType::Line,
                &[date, value],
                format!("{value} over time"),
                format!("Trend of {value} by {date}"),
            ));
        }
    }

    let keys = key_columns(structure);
    for config in &mut charts {
        config.key = config.variables.iter().any(|v| keys.contains(v));
    }
    // Stable: key charts first, each group in construction order.
    charts.sort_by_key(|c| !c.key);

    tracing::debug!(charts = charts.len(), key_columns = ?keys, "recommended charts");
    charts
}
