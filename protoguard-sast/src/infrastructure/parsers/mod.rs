//! Parser frontends producing the tree model
//!
//! Every frontend turns JavaScript source (or a pre-parsed ESTree document)
//! into a [`Value`] whose root is expected to be a `Program` node. A parse
//! failure is fatal for that input and is never retried.

pub mod espree;
pub mod estree_json;
pub mod treesitter;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{ScriptKind, Value};

pub use espree::EspreeFrontend;
pub use estree_json::EstreeJsonFrontend;
pub use treesitter::TreeSitterFrontend;

/// Produces a syntax tree for one source file
#[async_trait]
pub trait SyntaxTreeProvider: Send + Sync {
    /// Frontend name used in logs and reports
    fn name(&self) -> &'static str;

    /// Fails when the frontend cannot run at all (missing executable)
    async fn check_available(&self) -> Result<(), ParseError> {
        Ok(())
    }

    async fn parse(&self, path: &Path, source: &str, kind: ScriptKind) -> Result<Value, ParseError>;
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse {}: {message}", path.display())]
    Failed { path: PathBuf, message: String },

    #[error("Parser frontend unavailable: {0}")]
    FrontendUnavailable(String),

    #[error("Parser timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ESTree JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    pub fn failed(path: &Path, message: impl Into<String>) -> Self {
        Self::Failed {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
