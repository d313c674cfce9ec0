//! Output formatting.

use crate::cli::OutputFormat;
use aspx_symbols::PageError;
use camino::Utf8Path;
use serde::Serialize;

/// A formatted error for JSON output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// Always `Error`; markup problems have no lower severity.
    #[serde(rename = "type")]
    pub diagnostic_type: &'static str,
    /// The file path, relative to the workspace.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
}

impl From<aspx_symbols::Position> for Position {
    fn from(position: aspx_symbols::Position) -> Self {
        Self {
            line: position.line,
            column: position.column + 1,
        }
    }
}

/// Formats page errors for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the errors of one file.
    pub fn format(&self, errors: &[PageError], file_path: &Utf8Path, source: &str) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(errors, file_path),
            OutputFormat::HumanVerbose => self.format_human_verbose(errors, file_path, source),
            OutputFormat::Json => self.format_json(errors, file_path),
            OutputFormat::Machine => self.format_machine(errors, file_path),
        }
    }

    fn format_human(&self, errors: &[PageError], file_path: &Utf8Path) -> String {
        let mut output = String::new();

        for error in errors {
            let start = Position::from(error.location.start);
            output.push_str(&format!(
                "{}:{}:{}\nError: {}\n\n",
                file_path, start.line, start.column, error.message
            ));
        }

        output
    }

    /// Formats as human-readable output with code snippets.
    fn format_human_verbose(
        &self,
        errors: &[PageError],
        file_path: &Utf8Path,
        source: &str,
    ) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let mut output = String::new();

        for error in errors {
            let start = error.location.start;
            output.push_str(&format!(
                "{}:{}:{}\nError: {}\n",
                file_path,
                start.line,
                start.column + 1,
                error.message
            ));

            let line_index = start.line.saturating_sub(1) as usize;
            if let Some(line) = lines.get(line_index) {
                let gutter = start.line.to_string();
                output.push_str(&format!("  {} | {}\n", gutter, line));
                output.push_str(&format!(
                    "  {} | {}^\n",
                    " ".repeat(gutter.len()),
                    " ".repeat(start.column as usize)
                ));
            }

            output.push('\n');
        }

        output
    }

    fn format_json(&self, errors: &[PageError], file_path: &Utf8Path) -> String {
        let formatted = Self::format_json_diagnostics(errors, file_path);
        serde_json::to_string_pretty(&formatted).unwrap_or_default()
    }

    /// Formats errors into JSON-ready structs.
    pub fn format_json_diagnostics(
        errors: &[PageError],
        file_path: &Utf8Path,
    ) -> Vec<FormattedDiagnostic> {
        errors
            .iter()
            .map(|error| FormattedDiagnostic {
                diagnostic_type: "Error",
                filename: file_path.to_string(),
                start: error.location.start.into(),
                end: error.location.end.into(),
                message: error.message.clone(),
            })
            .collect()
    }

    /// Formats as machine-readable output, one line per error.
    fn format_machine(&self, errors: &[PageError], file_path: &Utf8Path) -> String {
        let mut output = String::new();

        for error in errors {
            let start = Position::from(error.location.start);
            let end = Position::from(error.location.end);
            output.push_str(&format!(
                "ERROR {}:{}:{}:{}:{} {}\n",
                file_path, start.line, start.column, end.line, end.column, error.message
            ));
        }

        output
    }
}

/// Summary of a check run.
#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Number of files checked.
    pub file_count: usize,
    /// Number of files with at least one error.
    pub failed_file_count: usize,
    /// Number of errors.
    pub error_count: usize,
}

impl CheckSummary {
    /// Whether the run should exit with a failure status.
    pub fn failed(&self) -> bool {
        self.error_count > 0
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let error_word = if self.error_count == 1 {
            "error"
        } else {
            "errors"
        };
        let file_word = if self.file_count == 1 {
            "file"
        } else {
            "files"
        };

        format!(
            "====================================\naspx-check found {} {} in {} of {} {}",
            self.error_count, error_word, self.failed_file_count, self.file_count, file_word
        )
    }
}
