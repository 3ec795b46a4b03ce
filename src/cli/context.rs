//! CLI Context - configuration, logging and output shared by all commands

use std::sync::Arc;

use anyhow::{Context, Result};
use protoguard_core::config::Config;
use protoguard_core::init_tracing;

use crate::cli::Cli;
use crate::cli::output::OutputWriter;

/// Context for CLI operations
pub struct CliContext {
    /// Application configuration
    pub config: Arc<Config>,

    /// Output writer configured based on CLI flags
    pub output: OutputWriter,
}

impl CliContext {
    /// Create a new CLI context from parsed CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

        // flags beat the configured level, RUST_LOG still beats both
        if cli.quiet {
            config.logging.level = "error".to_string();
        } else if cli.verbose {
            config.logging.level = "debug".to_string();
        }

        init_tracing(&config.logging).context("Failed to initialize logging")?;
        tracing::debug!(frontend = ?config.parser.frontend, "Configuration loaded");

        Ok(Self {
            config: Arc::new(config),
            output: OutputWriter::new(cli.format, cli.quiet, cli.verbose),
        })
    }
}
