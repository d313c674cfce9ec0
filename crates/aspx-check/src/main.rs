//! aspx-check: markup checker for ASP.NET Web Forms pages.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ASPX_CHECK_LOG";

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let summary = orchestrator::run(&args).into_diagnostic()?;
    if summary.failed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
