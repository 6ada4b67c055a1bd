//! Output formatter for human-readable and JSON output
//!
//! Ensures consistent output formatting across both phases.

use hs_core::TransferReport;
use serde::Serialize;

use super::OutputConfig;

/// Closing line of a phase
#[derive(Debug, Clone, PartialEq, Eq)]
enum Summary {
    Success(String),
    Warning(String),
}

impl Summary {
    fn of(report: &TransferReport, done: &str) -> Self {
        let transferred = report.transferred.len();

        if !report.is_success() {
            Self::Warning(format!(
                "Completed with errors: {transferred} succeeded, {} failed.",
                report.failed.len()
            ))
        } else if transferred == 0 {
            Self::Warning("Nothing to transfer.".to_string())
        } else {
            Self::Success(format!(
                "{done} {transferred} file(s) ({}).",
                humansize::format_size(report.total_bytes(), humansize::BINARY)
            ))
        }
    }
}

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, stdout carries only the JSON document.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            println!("\x1b[32m✓\x1b[0m {message}");
        } else {
            println!("✓ {message}");
        }
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else if self.colors_enabled() {
            eprintln!("\x1b[31m✗\x1b[0m {message}");
        } else {
            eprintln!("✗ {message}");
        }
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            eprintln!("\x1b[33m⚠\x1b[0m {message}");
        } else {
            eprintln!("⚠ {message}");
        }
    }

    /// Render the outcome of a phase
    ///
    /// JSON mode prints the whole report on stdout. Otherwise every failed
    /// transfer gets an error line, followed by a note about skipped keys
    /// and the summary.
    pub fn report(&self, report: &TransferReport, done: &str) {
        if self.config.json {
            self.json(report);
            return;
        }

        for failure in &report.failed {
            self.error(&format!(
                "{} -> {}: {}",
                failure.source, failure.target, failure.error
            ));
        }

        if !report.skipped.is_empty() {
            self.warning(&format!(
                "Skipped {} key(s) outside the source prefix.",
                report.skipped.len()
            ));
        }

        match Summary::of(report, done) {
            Summary::Success(message) => self.success(&message),
            Summary::Warning(message) => self.warning(&message),
        }
    }

    /// Output JSON directly
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
