//! # datalens
//!
//! Adapts itself to an arbitrary CSV table whose schema is not known ahead of
//! time. Each column is classified into one of six kinds, and the kinds then
//! decide which statistics, correlations and charts make sense for it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use datalens::analyser::DatasetStore;
//! use datalens::analyser::logic::{ChartPayload, FilterSpec, render};
//!
//! # fn example() -> datalens::error::Result<()> {
//! let store = DatasetStore::default();
//! store.load_csv_path(std::path::Path::new("patients.csv"))?;
//!
//! for profile in store.get_structure_analysis()?.column_profiles {
//!     println!("{}: {}", profile.name, profile.detected_type);
//! }
//!
//! let filter = FilterSpec::new().with_equals("estadio", "3");
//! let summary = store.get_summary(Some(&filter))?;
//! let settings = &store.config().statistics;
//! for chart in store.get_visualization_configs()? {
//!     if let Some(rendered) = render(&chart, ChartPayload::Summary(&summary), settings) {
//!         println!("{} ({:?})", rendered.title, rendered.fidelity);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser::logic`]: classifier, filters, statistics, correlation,
//!   chart recommendation and rendering
//! - [`analyser::store`]: the loaded dataset, swapped atomically per load
//! - [`config`]: thresholds and limits, loadable from JSON
//! - [`error`]: error type shared by the public API
//! - [`logging`]: `tracing` subscriber setup for the binary
//!
//! ## Data flow
//!
//! ```text
//! CSV -> cleaning -> classifier (once per load) -> recommender
//!                         |
//! request: filter -> statistics / correlation -> renderer
//! ```

pub mod analyser;
pub mod config;
pub mod error;
pub mod logging;
