//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Markup checker for ASP.NET Web Forms pages.
#[derive(Debug, Parser)]
#[command(name = "aspx-check")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Working directory for the check
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Path to aspx.config.json (defaults to the one in the workspace)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print the control tree of every page to stderr (for debugging)
    #[arg(long = "emit-tree")]
    pub emit_tree: bool,

    /// Print timing breakdowns
    #[arg(long)]
    pub timings: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Human-readable with code snippets
    HumanVerbose,
    /// JSON output
    Json,
    /// Machine-readable (one line per error)
    Machine,
}
