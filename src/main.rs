//! # datalens command-line entry point
//!
//! Loads one CSV, runs a single analysis request against it and prints the
//! result as pretty JSON on stdout. Logs go to stderr and to the rolling log
//! files described in [`datalens::logging`].
//!
//! ```bash
//! datalens structure patients.csv
//! datalens summary patients.csv --range edad=30:50 --eq estadio=3
//! datalens correlations patients.csv --method spearman
//! datalens render patients.csv --chart 0 --summary-only
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // JSON results go to stdout

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    if let Err(e) = datalens::logging::init() {
        datalens::logging::init_stderr_only();
        tracing::warn!("File logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();
    cli::run_command(cli)
}
