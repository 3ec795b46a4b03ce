//! Scan Command - prototype-pollution analysis of files and directories

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use protoguard_core::config::JavaScriptFrontend;
use protoguard_sast::{FileScanReport, ParseError, ProjectScanReport, ScanError, ScanProjectUseCase};

use crate::cli::context::CliContext;
use crate::cli::exit_codes;
use crate::cli::output::OutputFormat;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// JavaScript parser frontend (overrides `parser.frontend`)
    #[arg(long, value_enum)]
    pub frontend: Option<FrontendArg>,

    /// Treat inputs as pre-parsed ESTree JSON documents
    #[arg(long)]
    pub ast: bool,

    /// Exit with status 1 when any finding is reported
    #[arg(long)]
    pub fail_on_findings: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontendArg {
    TreeSitter,
    Espree,
}

impl From<FrontendArg> for JavaScriptFrontend {
    fn from(arg: FrontendArg) -> Self {
        match arg {
            FrontendArg::TreeSitter => JavaScriptFrontend::TreeSitter,
            FrontendArg::Espree => JavaScriptFrontend::Espree,
        }
    }
}

/// A command-line path that could not be scanned at all
#[derive(Debug, Serialize)]
pub struct PathError {
    pub path: PathBuf,
    pub error: String,
    #[serde(skip)]
    pub exit_code: i32,
}

/// Everything the scan command reports
#[derive(Debug, Default, Serialize)]
pub struct ScanOutput {
    pub reports: Vec<ProjectScanReport>,
    pub errors: Vec<PathError>,
    pub finding_count: usize,
}

impl ScanOutput {
    /// Failures win over findings; among failures the highest code wins
    pub fn exit_code(&self, fail_on_findings: bool) -> i32 {
        let failure = self
            .errors
            .iter()
            .map(|e| e.exit_code)
            .chain(
                self.reports
                    .iter()
                    .flat_map(|r| r.failures.iter().map(|f| error_exit_code(&f.error))),
            )
            .max();

        match failure {
            Some(code) => code,
            None if fail_on_findings && self.finding_count > 0 => exit_codes::FINDINGS,
            None => exit_codes::SUCCESS,
        }
    }
}

/// Run the scan command
pub async fn run(ctx: &CliContext, args: &ScanArgs) -> Result<i32> {
    let mut config = (*ctx.config).clone();
    if let Some(frontend) = args.frontend {
        config.parser.frontend = frontend.into();
    }

    let use_case = ScanProjectUseCase::with_config(&config).pre_parsed(args.ast);
    let text = ctx.output.format() == OutputFormat::Text;

    let mut output = ScanOutput::default();
    for path in &args.paths {
        match use_case.execute(path).await {
            Ok(report) => {
                if text {
                    render_report(ctx, &report);
                }
                output.finding_count += report.finding_count();
                output.reports.push(report);
            }
            Err(error) => {
                if text {
                    ctx.output.error(&describe(path, &error));
                }
                output.errors.push(PathError {
                    path: path.clone(),
                    error: error.to_string(),
                    exit_code: error_exit_code(&error),
                });
            }
        }
    }

    let files_scanned: usize = output.reports.iter().map(|r| r.files_scanned).sum();
    tracing::info!(files_scanned, findings = output.finding_count, "Scan finished");

    match ctx.output.format() {
        OutputFormat::Json => ctx.output.json(&output)?,
        OutputFormat::Text => ctx.output.debug(&format!(
            "Scanned {} file(s), {} finding(s)",
            files_scanned, output.finding_count
        )),
    }

    Ok(output.exit_code(args.fail_on_findings))
}

fn render_report(ctx: &CliContext, report: &ProjectScanReport) {
    if report.files_scanned == 0 && report.failures.is_empty() {
        ctx.output.warn(&format!(
            "No supported files found in '{}'",
            report.root.display()
        ));
    }

    for file in &report.files {
        render_file(ctx, file);
    }

    for failure in &report.failures {
        ctx.output.error(&describe(&failure.path, &failure.error));
    }
}

fn render_file(ctx: &CliContext, file: &FileScanReport) {
    if file.findings.is_empty() {
        ctx.output.print_unless_quiet(&format!(
            "[✓] No prototype pollution detected in '{}'.",
            file.path.display()
        ));
        return;
    }

    ctx.output.print(&format!(
        "[!] Prototype pollution risks detected in '{}':\n",
        file.path.display()
    ));
    for finding in file.findings.iter() {
        ctx.output.print(&finding.to_string());
    }
}

/// Error message, prefixed with the path when the error does not name it
fn describe(path: &Path, error: &ScanError) -> String {
    let names_path = matches!(
        error,
        ScanError::NotFound(_)
            | ScanError::UnsupportedFile(_)
            | ScanError::Io { .. }
            | ScanError::FileTooLarge { .. }
            | ScanError::Parse(ParseError::Failed { .. } | ParseError::InvalidJson { .. })
    );

    if names_path {
        error.to_string()
    } else {
        format!("{}: {}", path.display(), error)
    }
}

fn error_exit_code(error: &ScanError) -> i32 {
    match error {
        ScanError::NotFound(_)
        | ScanError::UnsupportedFile(_)
        | ScanError::Io { .. }
        | ScanError::FileTooLarge { .. }
        | ScanError::Parse(ParseError::FrontendUnavailable(_) | ParseError::Io(_)) => {
            exit_codes::CONFIG_ERROR
        }
        ScanError::Parse(_)
        | ScanError::InvalidTree(_)
        | ScanError::TreeTooLarge { .. }
        | ScanError::TreeTooDeep { .. } => exit_codes::PARSE_ERROR,
    }
}
