//! Output formatting
//!
//! Reports go to stdout. Progress and diagnostics go to stderr so that
//! `--format json` output stays parseable.

use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI results
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Writes command output according to the global flags
pub struct OutputWriter {
    format: OutputFormat,
    quiet: bool,
    verbose: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Report line on stdout
    pub fn print(&self, message: &str) {
        println!("{}", message);
    }

    /// Report line on stdout, skipped with `--quiet`
    pub fn print_unless_quiet(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("{}", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("[WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("[ERROR] {}", message);
    }

    /// Pretty-printed JSON on stdout
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
