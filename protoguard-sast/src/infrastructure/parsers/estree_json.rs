//! Pre-parsed ESTree input

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{ParseError, SyntaxTreeProvider};
use crate::domain::{ScriptKind, Value};
use crate::infrastructure::estree;

/// Treats the input itself as an ESTree JSON document, as written by
/// `espree.parse` or any ESTree-compatible parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct EstreeJsonFrontend;

impl EstreeJsonFrontend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SyntaxTreeProvider for EstreeJsonFrontend {
    fn name(&self) -> &'static str {
        "estree-json"
    }

    #[instrument(skip(self, source, _kind), fields(path = %path.display(), source_len = source.len()))]
    async fn parse(&self, path: &Path, source: &str, _kind: ScriptKind) -> Result<Value, ParseError> {
        let tree = estree::from_str(source).map_err(|source| ParseError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(root = tree.type_name(), "ESTree document loaded");
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_program() {
        let frontend = EstreeJsonFrontend::new();
        let tree = frontend
            .parse(
                Path::new("ast.json"),
                r#"{"type": "Program", "body": [], "sourceType": "module"}"#,
                ScriptKind::default(),
            )
            .await
            .unwrap();
        assert_eq!(tree.as_node().map(|n| n.kind()), Some("Program"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_parse_error() {
        let frontend = EstreeJsonFrontend::new();
        let err = frontend
            .parse(Path::new("ast.json"), "{", ScriptKind::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }
}
