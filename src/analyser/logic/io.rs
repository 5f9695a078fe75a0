use anyhow::{Context as _, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Every column is read as text; typing is the classifier's job, and a
/// parser-inferred schema would reject mixed columns such as `1, 2, 3A`.
fn read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

pub fn load_csv_path(path: &Path) -> Result<DataFrame> {
    let df = read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read csv"
    );
    Ok(df)
}

pub fn load_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let df = read_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("Failed to read CSV from memory")?;
    tracing::info!(rows = df.height(), columns = df.width(), "read csv bytes");
    Ok(df)
}
