//! Directory scanner for JavaScript sources

use std::path::{Path, PathBuf};

use protoguard_core::config::SourceType;
use tracing::{debug, instrument, trace};
use walkdir::{DirEntry, WalkDir};

use crate::domain::ScriptKind;

/// File to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFile {
    pub path: PathBuf,
    pub kind: ScriptKind,
}

/// Directory scanner for finding source files
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    max_depth: usize,
    exclude_patterns: Vec<String>,
    default_source_type: SourceType,
    pre_parsed: bool,
}

impl DirectoryScanner {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            exclude_patterns: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
            ],
            default_source_type: SourceType::default(),
            pre_parsed: false,
        }
    }

    /// Directory names skipped during the walk (the root itself is never skipped)
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_default_source_type(mut self, source_type: SourceType) -> Self {
        self.default_source_type = source_type;
        self
    }

    /// Collect `.json` ESTree documents instead of JavaScript sources
    pub fn pre_parsed(mut self, pre_parsed: bool) -> Self {
        self.pre_parsed = pre_parsed;
        self
    }

    /// Classify a single file, `None` when it is not scannable
    pub fn classify(&self, path: &Path) -> Option<ScanFile> {
        let kind = if self.pre_parsed {
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            is_json.then(ScriptKind::default)?
        } else {
            ScriptKind::from_path(path, self.default_source_type)?
        };
        Some(ScanFile {
            path: path.to_path_buf(),
            kind,
        })
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude_patterns.iter().any(|p| p == name))
    }

    /// Scan directory for source files, sorted by path
    #[instrument(skip(self), fields(root = %root.display(), max_depth = self.max_depth))]
    pub fn scan(&self, root: &Path) -> Result<Vec<ScanFile>, std::io::Error> {
        let mut files = Vec::new();
        let mut excluded_count = 0;

        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if self.is_excluded(entry) {
                    trace!(directory = %entry.path().display(), "Excluding directory");
                    excluded_count += 1;
                    false
                } else {
                    true
                }
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(file) = self.classify(entry.path()) {
                trace!(file = %file.path.display(), kind = ?file.kind, "Found scannable file");
                files.push(file);
            }
        }

        debug!(
            file_count = files.len(),
            excluded_dirs = excluded_count,
            "Directory scan completed"
        );
        Ok(files)
    }
}
