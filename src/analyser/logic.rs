pub mod classify;
pub mod cleaning;
pub mod correlation;
pub mod filter;
pub mod health;
pub mod io;
pub mod profiling;
pub mod recommend;
pub mod render;
pub mod types;
pub mod values;

pub use classify::{analyse_structure, classify_column};
pub use cleaning::{CleaningReport, clean_table};
pub use correlation::correlate;
pub use filter::{FilterOutcome, apply_filters};
pub use health::{QualityReport, quality_report};
pub use io::{load_csv_bytes, load_csv_path};
pub use profiling::summarize;
pub use recommend::recommend;
pub use render::{
    ChartPayload, ChartPrimitive, Fidelity, RawColumn, RawSeries, RenderedChart, render,
};
pub use types::{
    CategoricalSummary, ChartType, ClassificationRule, ColumnKind, ColumnProfile,
    CorrelationMethod, CorrelationResult, CorrelationStrength, FilterSpec, NumericSummary,
    SignificantPair, SkippedFilter, StructureAnalysis, SummaryStatistics, VisualizationConfig,
};
