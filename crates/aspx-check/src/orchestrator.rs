//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{AspxConfig, ConfigError};
use crate::output::{CheckSummary, Formatter};
use aspx_symbols::{
    parse_page, render_tree, ControlLookup, Location, PageError, ParsedPage, Position,
};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use std::fs;
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

/// Directories never checked.
const DEFAULT_IGNORES: &[&str] = &["**/bin/**", "**/obj/**", "**/node_modules/**"];

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The workspace cannot be used.
    #[error("invalid workspace: {0}")]
    Workspace(String),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Failed to read a page.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

/// One checked file.
#[derive(Debug)]
pub struct FileReport {
    /// Path relative to the workspace.
    pub path: Utf8PathBuf,
    pub source: String,
    pub page: ParsedPage,
}

/// Runs the check on all files.
pub fn run(args: &Args) -> Result<CheckSummary, OrchestratorError> {
    let total_start = Instant::now();
    let workspace = resolve_workspace(&args.workspace)?;
    let config = AspxConfig::load(&workspace, args.config.as_deref())?;

    let ignore_set = build_ignore_set(config.exclude.iter().chain(&args.ignore))?;

    let scan_start = Instant::now();
    let files = discover_files(&workspace, &config.file_extensions(), &ignore_set);
    let scan_time = scan_start.elapsed();
    tracing::info!(%workspace, files = files.len(), "discovered pages");

    let registry = config.registry();
    let parse_start = Instant::now();
    let reports = check_files(&workspace, &files, &registry)?;
    let parse_time = parse_start.elapsed();

    if args.emit_tree {
        for report in &reports {
            eprintln!(
                "=== Tree for {} ===\n{}",
                report.path,
                render_tree(&report.page)
            );
        }
    }

    print_reports(&reports, args.output);

    let summary = CheckSummary {
        file_count: reports.len(),
        failed_file_count: reports.iter().filter(|r| r.page.has_errors()).count(),
        error_count: reports.iter().map(|r| r.page.errors.len()).sum(),
    };

    if matches!(args.output, OutputFormat::Human | OutputFormat::HumanVerbose) {
        println!("{}", summary.format());
    }

    if args.timings {
        eprintln!("=== aspx-check timings ===");
        eprintln!("file scan: {:?} ({} files)", scan_time, files.len());
        eprintln!("parse phase: {:?}", parse_time);
        eprintln!("total: {:?}", total_start.elapsed());
    }

    Ok(summary)
}

/// Makes the workspace path absolute.
fn resolve_workspace(workspace: &Utf8Path) -> Result<Utf8PathBuf, OrchestratorError> {
    if workspace.is_absolute() {
        return Ok(workspace.to_owned());
    }
    let current = std::env::current_dir()
        .map_err(|e| OrchestratorError::Workspace(e.to_string()))?;
    let current = Utf8PathBuf::try_from(current)
        .map_err(|e| OrchestratorError::Workspace(e.to_string()))?;
    Ok(current.join(workspace))
}

/// Builds the ignore set from the given patterns plus the default ignores.
pub fn build_ignore_set<'a>(
    patterns: impl IntoIterator<Item = &'a String>,
) -> Result<GlobSet, OrchestratorError> {
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in patterns
        .into_iter()
        .map(String::as_str)
        .chain(DEFAULT_IGNORES.iter().copied())
    {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }

    ignore_builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Finds the files to check, as sorted workspace-relative paths.
pub fn discover_files(
    workspace: &Utf8Path,
    extensions: &[&str],
    ignore_set: &GlobSet,
) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(workspace)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter_map(|p| p.strip_prefix(workspace).ok().map(Utf8Path::to_path_buf))
        .filter(|p| {
            let file_name = p.file_name().unwrap_or("").to_ascii_lowercase();
            extensions
                .iter()
                .any(|ext| file_name.ends_with(&ext.to_ascii_lowercase()))
        })
        .filter(|p| !ignore_set.is_match(p.as_str()))
        .collect();
    files.sort();
    files
}

/// Parses every file in parallel against the shared lookup.
///
/// Reports come back in the order of `files`.
pub fn check_files<L: ControlLookup + Sync + ?Sized>(
    workspace: &Utf8Path,
    files: &[Utf8PathBuf],
    lookup: &L,
) -> Result<Vec<FileReport>, OrchestratorError> {
    files
        .par_iter()
        .map(|relative| {
            let bytes = fs::read(workspace.join(relative)).map_err(|source| {
                OrchestratorError::ReadFailed {
                    path: relative.clone(),
                    source,
                }
            })?;
            let (source, page) = match String::from_utf8(bytes) {
                Ok(source) => {
                    let page = parse_page(relative, &source, lookup);
                    (source, page)
                }
                Err(err) => {
                    tracing::warn!(path = %relative, "page is not valid UTF-8");
                    let valid_up_to = err.utf8_error().valid_up_to();
                    let source = String::from_utf8_lossy(err.as_bytes()).into_owned();
                    let mut page = parse_page(relative, &source, lookup);
                    page.errors.push(invalid_utf8_error(relative, &source[..valid_up_to]));
                    page.errors.sort_by_key(|error| error.location.start);
                    (source, page)
                }
            };
            Ok(FileReport {
                path: relative.clone(),
                source,
                page,
            })
        })
        .collect()
}

/// Points at the first invalid byte, which follows the valid `prefix`.
fn invalid_utf8_error(path: &Utf8Path, prefix: &str) -> PageError {
    let line = prefix.matches('\n').count() as u32 + 1;
    let column = prefix.rfind('\n').map_or(prefix.len(), |i| prefix.len() - i - 1) as u32;
    let position = Position::new(line, column);
    PageError::new(
        "file is not valid UTF-8",
        Location::new(path.as_str(), position, position),
    )
}

fn print_reports(reports: &[FileReport], format: OutputFormat) {
    if format == OutputFormat::Json {
        let diagnostics: Vec<_> = reports
            .iter()
            .flat_map(|r| Formatter::format_json_diagnostics(&r.page.errors, &r.path))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&diagnostics).unwrap_or_default()
        );
        return;
    }

    let formatter = Formatter::new(format);
    for report in reports.iter().filter(|r| r.page.has_errors()) {
        print!(
            "{}",
            formatter.format(&report.page.errors, &report.path, &report.source)
        );
    }
}
