//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "protoguard";

/// Prefix of environment variable overrides (`PROTOGUARD__SECTION__KEY`)
pub const ENV_PREFIX: &str = "PROTOGUARD";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub scan: ScanConfig,
    pub parser: ParserConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter, overridden by `RUST_LOG` when set
    pub level: String,
    /// Either "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum depth for directory scanning
    pub max_scan_depth: usize,
    /// Patterns to exclude from scanning (directory names)
    pub exclude_patterns: Vec<String>,
    /// Maximum file size to analyze in bytes (larger files are reported, not parsed)
    pub max_file_size_bytes: Option<u64>,
    /// Maximum number of files parsed and scanned at the same time
    pub max_concurrent_files: usize,
    /// Reject syntax trees with more nodes than this before scanning
    pub max_tree_nodes: Option<usize>,
    /// Reject syntax trees nested deeper than this before scanning
    pub max_tree_depth: Option<usize>,
    /// Property names whose assignment is reported
    pub sensitive_properties: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_scan_depth: 10,
            exclude_patterns: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
                "dist".to_string(),
                "build".to_string(),
                "vendor".to_string(),
            ],
            max_file_size_bytes: Some(2 * 1024 * 1024),
            max_concurrent_files: 4,
            max_tree_nodes: None,
            max_tree_depth: None,
            sensitive_properties: vec![
                "__proto__".to_string(),
                "constructor".to_string(),
                "prototype".to_string(),
            ],
        }
    }
}

/// JavaScript parser frontend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JavaScriptFrontend {
    /// In-process tree-sitter parse converted to an ESTree-shaped tree
    #[default]
    TreeSitter,
    /// External `node` process running espree
    Espree,
}

/// ECMAScript source type handed to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Module,
    Script,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Module => "module",
            SourceType::Script => "script",
        }
    }
}

/// Parser frontend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub frontend: JavaScriptFrontend,
    /// Path to the node executable (or "node" if in PATH)
    pub node_executable: String,
    /// Directory whose `node_modules` provides espree; defaults to the working directory
    pub node_modules_dir: Option<PathBuf>,
    /// Timeout for one external parser invocation
    pub timeout_seconds: u64,
    /// `ecmaVersion` passed to espree
    pub ecma_version: String,
    /// Source type for `.js`/`.jsx` files (`.mjs` is always a module, `.cjs` always a script)
    pub default_source_type: SourceType,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            frontend: JavaScriptFrontend::default(),
            node_executable: "node".to_string(),
            node_modules_dir: None,
            timeout_seconds: 30,
            ecma_version: "latest".to_string(),
            default_source_type: SourceType::Module,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    ///
    /// Sources in increasing priority: `protoguard.toml` in the working
    /// directory, the explicit `path`, then `PROTOGUARD__*` environment variables.
    /// List settings take comma-separated values in the environment, e.g.
    /// `PROTOGUARD__SCAN__EXCLUDE_PATTERNS=node_modules,dist`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        Self::load_with_environment(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("scan.exclude_patterns")
            .with_list_parse_key("scan.sensitive_properties")
    }

    fn load_with_environment(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigLoadError::NotFound(path.to_path_buf()));
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(environment);

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
