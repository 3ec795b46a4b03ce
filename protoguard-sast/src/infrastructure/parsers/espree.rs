//! espree executor
//!
//! Runs `node` with a small embedded script that parses stdin with espree and
//! prints the ESTree JSON on stdout. Requirements:
//! - `node` on `PATH` (or `parser.node_executable`)
//! - the `espree` package resolvable from `parser.node_modules_dir`, or from
//!   the working directory when unset

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use protoguard_core::config::ParserConfig;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};

use super::{ParseError, SyntaxTreeProvider};
use crate::domain::{ScriptKind, Value};
use crate::infrastructure::estree;

/// Options arrive as a JSON argument, source on stdin
const PARSE_SCRIPT: &str = r#"
const espree = require('espree');
const options = JSON.parse(process.argv[1]);
let code = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { code += chunk; });
process.stdin.on('end', () => {
  try {
    const ast = espree.parse(code, Object.assign({}, options, { loc: true, range: true }));
    process.stdout.write(JSON.stringify(ast));
  } catch (err) {
    const where = err.lineNumber ? ` (line ${err.lineNumber}, column ${err.column})` : '';
    process.stderr.write(`[ESPREE PARSE ERROR]: ${err.message}${where}\n`);
    process.exit(1);
  }
});
"#;

/// Marker node prints when `require('espree')` fails
const MISSING_MODULE: &str = "Cannot find module 'espree'";

/// espree parser frontend
#[derive(Debug, Clone)]
pub struct EspreeFrontend {
    executable: String,
    node_modules_dir: Option<PathBuf>,
    timeout: Duration,
    ecma_version: String,
}

impl EspreeFrontend {
    pub fn new() -> Self {
        Self::with_config(&ParserConfig::default())
    }

    pub fn with_config(config: &ParserConfig) -> Self {
        Self {
            executable: config.node_executable.clone(),
            node_modules_dir: config.node_modules_dir.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            ecma_version: config.ecma_version.clone(),
        }
    }

    /// Check that node is installed and accessible
    #[instrument(skip(self))]
    pub async fn check_installation(&self) -> Result<String, ParseError> {
        let output = Command::new(&self.executable)
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.unavailable(e))?;

        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!(version = %version, "node found");
            Ok(version)
        } else {
            Err(ParseError::FrontendUnavailable(format!(
                "'{} --version' exited with {}",
                self.executable, output.status
            )))
        }
    }

    /// espree options for one file
    fn options(&self, kind: ScriptKind) -> serde_json::Value {
        // espree wants a number unless the version is "latest"
        let ecma_version = self
            .ecma_version
            .parse::<u32>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(self.ecma_version.as_str()));

        serde_json::json!({
            "ecmaVersion": ecma_version,
            "sourceType": kind.source_type.as_str(),
            "ecmaFeatures": { "jsx": kind.jsx },
        })
    }

    fn unavailable(&self, err: std::io::Error) -> ParseError {
        if err.kind() == std::io::ErrorKind::NotFound {
            ParseError::FrontendUnavailable(format!(
                "'{}' not found. Install Node.js or set parser.node_executable",
                self.executable
            ))
        } else {
            ParseError::FrontendUnavailable(format!("failed to start '{}': {}", self.executable, err))
        }
    }
}

impl Default for EspreeFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyntaxTreeProvider for EspreeFrontend {
    fn name(&self) -> &'static str {
        "espree"
    }

    async fn check_available(&self) -> Result<(), ParseError> {
        self.check_installation().await.map(|_| ())
    }

    #[instrument(skip(self, source), fields(path = %path.display(), source_len = source.len()))]
    async fn parse(&self, path: &Path, source: &str, kind: ScriptKind) -> Result<Value, ParseError> {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-e")
            .arg(PARSE_SCRIPT)
            .arg(self.options(kind).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.node_modules_dir {
            cmd.current_dir(dir);
        }

        debug!(executable = %self.executable, source_type = kind.source_type.as_str(), "Executing espree");

        let mut child = cmd.spawn().map_err(|e| self.unavailable(e))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ParseError::FrontendUnavailable("node stdin was not captured".to_string()))?;

        // stdin is dropped once written, closing the pipe
        let feed = async move { stdin.write_all(source.as_bytes()).await };

        let (fed, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| {
            warn!(timeout_secs = self.timeout.as_secs(), "espree timed out");
            ParseError::Timeout(self.timeout.as_secs())
        })?;
        let output = output?;

        if let Err(e) = fed {
            // node exits without draining stdin when espree cannot be loaded
            debug!(error = %e, "Could not write the whole source to node");
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            if stderr.contains(MISSING_MODULE) {
                return Err(ParseError::FrontendUnavailable(
                    "the espree package is not installed. Run 'npm install espree' or set parser.node_modules_dir"
                        .to_string(),
                ));
            }
            error!(exit_code = output.status.code(), stderr = %stderr.trim(), "espree failed");
            return Err(ParseError::failed(path, stderr.trim()));
        }

        let tree = estree::from_slice(&output.stdout).map_err(|source| ParseError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(stdout_len = output.stdout.len(), "espree AST parsed successfully");
        Ok(tree)
    }
}
