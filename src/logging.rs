//! Logging setup for the datalens binary.
//!
//! Logs go to stderr (stdout carries the JSON the CLI prints) and to daily
//! rolling files in the platform data directory. The library itself only emits
//! `tracing` events; embedding applications install their own subscriber.
//!
//! ```no_run
//! datalens::logging::init().expect("Failed to initialize logging");
//! tracing::info!("ready");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/datalens/logs`
/// - macOS: `~/Library/Application Support/datalens/logs`
/// - Linux: `~/.local/share/datalens/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;

    let log_dir = base_dir.join("datalens").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Installs the global subscriber.
///
/// Creates two daily-rotated files, keeping 10 of each:
/// - `datalens.<date>.log`: everything passing the env filter
/// - `warnings.<date>.log`: warnings and errors only (skipped filter clauses,
///   unreadable columns)
///
/// # Errors
///
/// Returns error if log directory cannot be created or file appenders fail
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("datalens")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create all-logs file appender")?;

    let warn_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("warnings")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create warning-logs file appender")?;

    // Default to INFO, allow override with RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let warn_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(warn_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(all_logs_layer)
        .with(warn_logs_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!("Logging initialized, log directory: {}", log_dir.display());

    Ok(())
}

/// Console-only fallback used when the data directory is not writable.
pub fn init_stderr_only() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ignored = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_dir() {
        if let Ok(log_dir) = get_log_dir() {
            assert!(log_dir.ends_with("datalens/logs") || log_dir.ends_with("datalens\\logs"));
        }
    }
}
