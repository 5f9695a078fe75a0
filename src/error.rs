//! Centralized error handling for datalens.
//!
//! Most failures inside the engine are recovered locally: a column the
//! classifier cannot read becomes `text`, and a filter clause that does not fit
//! its column is skipped. The variants below are what is left for callers.
//!
//! ## Matching on errors
//!
//! ```
//! use datalens::error::DatalensError;
//!
//! fn banner(err: &DatalensError) -> &'static str {
//!     match err {
//!         DatalensError::NoDataLoaded => "Upload a dataset to get started",
//!         DatalensError::InvalidArgument(_) => "Check the request parameters",
//!         _ => "Something went wrong",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! The `ResultExt` trait adds `.context()` to any `Result` whose error converts
//! into [`DatalensError`]:
//!
//! ```no_run
//! use datalens::error::ResultExt as _;
//!
//! fn read_settings() -> datalens::error::Result<String> {
//!     let text = std::fs::read_to_string("config.json").context("Failed to read settings")?;
//!     Ok(text)
//! }
//! ```

use std::fmt;

/// Main error type for datalens operations.
#[derive(Debug)]
pub enum DatalensError {
    /// An analysis request arrived before any dataset was loaded.
    NoDataLoaded,

    /// I/O errors (reading CSV files, config, logs)
    Io(std::io::Error),

    /// Data processing errors (Polars, parsing, etc.)
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// A request parameter was not understood (e.g. an unknown correlation method)
    InvalidArgument(String),

    /// A filter clause referenced a column that is not in the table
    UnknownColumn(String),

    /// A filter clause cannot be evaluated against the column's values
    FilterTypeMismatch { column: String, reason: String },

    /// Generic error with context
    Other(String),
}

impl fmt::Display for DatalensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDataLoaded => write!(f, "No data loaded"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::UnknownColumn(name) => write!(f, "Unknown column: '{name}'"),
            Self::FilterTypeMismatch { column, reason } => {
                write!(f, "Filter on '{column}' does not match its values: {reason}")
            }
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DatalensError {}

impl DatalensError {
    /// True for the one condition callers should surface as "no data yet"
    /// rather than as a failed request.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoDataLoaded)
    }
}

impl From<std::io::Error> for DatalensError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for DatalensError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for DatalensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for DatalensError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<DatalensError> for String {
    fn from(err: DatalensError) -> Self {
        err.to_string()
    }
}

/// Result type alias for datalens operations.
pub type Result<T> = std::result::Result<T, DatalensError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DatalensError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: DatalensError = e.into();
            DatalensError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: DatalensError = e.into();
            DatalensError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatalensError::DataProcessing("column not found".to_owned());
        assert_eq!(err.to_string(), "Data processing error: column not found");

        let err = DatalensError::FilterTypeMismatch {
            column: "age".to_owned(),
            reason: "no numeric values".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Filter on 'age' does not match its values: no numeric values"
        );
    }

    #[test]
    fn test_no_data_is_distinct() {
        assert!(DatalensError::NoDataLoaded.is_no_data());
        assert!(!DatalensError::UnknownColumn("x".to_owned()).is_no_data());

        let s: String = DatalensError::NoDataLoaded.into();
        assert_eq!(s, "No data loaded");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.txt",
        ));

        let result: Result<()> = result.context("Failed to read file");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read file")
        );
    }
}
