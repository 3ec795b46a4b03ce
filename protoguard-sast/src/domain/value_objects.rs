//! Value objects

use std::path::Path;

use protoguard_core::config::SourceType;

/// A JavaScript source file flavour, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptKind {
    pub source_type: SourceType,
    pub jsx: bool,
}

impl ScriptKind {
    /// Classify a path, `None` when it is not a JavaScript source.
    ///
    /// `.mjs` is always a module and `.cjs` always a script; `.js` and `.jsx`
    /// use `default_source_type`.
    pub fn from_path(path: &Path, default_source_type: SourceType) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let kind = match ext.as_str() {
            "mjs" => Self {
                source_type: SourceType::Module,
                jsx: false,
            },
            "cjs" => Self {
                source_type: SourceType::Script,
                jsx: false,
            },
            "js" => Self {
                source_type: default_source_type,
                jsx: false,
            },
            "jsx" => Self {
                source_type: default_source_type,
                jsx: true,
            },
            _ => return None,
        };
        Some(kind)
    }
}

impl Default for ScriptKind {
    fn default() -> Self {
        Self {
            source_type: SourceType::Module,
            jsx: false,
        }
    }
}
