//! Protoguard CLI - Command-line interface for prototype-pollution scanning
//!
//! ## Commands
//! - `scan`: scan JavaScript files and directories (or ESTree JSON with `--ast`)
//! - `rules`: list the active rule set

mod commands;
mod context;
mod output;

pub use context::CliContext;
pub use output::{OutputFormat, OutputWriter};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Protoguard - find prototype-pollution sinks in JavaScript
#[derive(Parser, Debug)]
#[command(
    name = "protoguard",
    version,
    about = "Structural prototype-pollution scanner for JavaScript",
    long_about = "Protoguard parses JavaScript into an ESTree-shaped syntax tree and reports \
                  every assignment whose target is a sensitive property such as __proto__, \
                  constructor or prototype.\n\n\
                  Configuration is read from protoguard.toml, --config and PROTOGUARD__* \
                  environment variables."
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print findings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, env = "PROTOGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan files or directories for prototype-pollution risks
    #[command(visible_alias = "s")]
    Scan(commands::scan::ScanArgs),

    /// List the active detection rules
    Rules,
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
    context: CliContext,
}

impl CliApp {
    /// Parse arguments and build the context
    pub fn new() -> anyhow::Result<Self> {
        let cli = Cli::parse();
        let context = CliContext::new(&cli)?;
        Ok(Self { cli, context })
    }

    /// Run the selected command and return the process exit code
    pub async fn run(self) -> anyhow::Result<i32> {
        match self.cli.command {
            Commands::Scan(ref args) => commands::scan::run(&self.context, args).await,
            Commands::Rules => commands::rules::run(&self.context),
        }
    }
}

/// Exit codes for CI integration
pub mod exit_codes {
    /// Success, no failures (findings only count with `--fail-on-findings`)
    pub const SUCCESS: i32 = 0;
    /// Findings reported and `--fail-on-findings` set
    pub const FINDINGS: i32 = 1;
    /// Configuration or input error (missing path, unsupported file)
    pub const CONFIG_ERROR: i32 = 2;
    /// Source could not be parsed or the tree was rejected
    pub const PARSE_ERROR: i32 = 3;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = 99;
}
