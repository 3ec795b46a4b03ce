//! Scan use cases

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument, warn};

use protoguard_core::config::{Config, ParserConfig};

use crate::domain::{ScanResult, Value};
use crate::infrastructure::parser_frontend::ParserFrontendSelector;
use crate::infrastructure::parsers::{ParseError, SyntaxTreeProvider};
use crate::infrastructure::rules::RuleRepository;
use crate::infrastructure::scanner::{DirectoryScanner, ScanFile};
use crate::infrastructure::traversal::{self, InvalidTree, TreeStats};

/// Findings of one file
#[derive(Debug, Clone, Serialize)]
pub struct FileScanReport {
    pub path: PathBuf,
    pub findings: ScanResult,
}

/// A file that could not be scanned
#[derive(Debug, Serialize)]
pub struct FileScanFailure {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_display")]
    pub error: ScanError,
}

/// Result of scanning a file or directory
#[derive(Debug, Serialize)]
pub struct ProjectScanReport {
    pub root: PathBuf,
    pub files_scanned: usize,
    pub files: Vec<FileScanReport>,
    pub failures: Vec<FileScanFailure>,
}

impl ProjectScanReport {
    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    pub fn has_findings(&self) -> bool {
        self.files.iter().any(|f| !f.findings.is_empty())
    }
}

/// Use case for scanning a file or a project directory
pub struct ScanProjectUseCase {
    scanner: DirectoryScanner,
    selector: ParserFrontendSelector,
    parser_config: ParserConfig,
    provider: Arc<dyn SyntaxTreeProvider>,
    rule_repository: RuleRepository,
    max_file_size_bytes: Option<u64>,
    max_tree_nodes: Option<usize>,
    max_tree_depth: Option<usize>,
    max_concurrent_files: usize,
}

impl ScanProjectUseCase {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let scanner = DirectoryScanner::new(config.scan.max_scan_depth)
            .with_exclude_patterns(config.scan.exclude_patterns.clone())
            .with_default_source_type(config.parser.default_source_type);

        let selector = ParserFrontendSelector::new(config.parser.frontend);
        let provider = selector.provider(&config.parser);

        Self {
            scanner,
            selector,
            parser_config: config.parser.clone(),
            provider,
            rule_repository: RuleRepository::from_config(&config.scan),
            max_file_size_bytes: config.scan.max_file_size_bytes,
            max_tree_nodes: config.scan.max_tree_nodes,
            max_tree_depth: config.scan.max_tree_depth,
            max_concurrent_files: config.scan.max_concurrent_files.max(1),
        }
    }

    /// Read inputs as ESTree JSON documents (`.json` files) instead of JavaScript
    pub fn pre_parsed(mut self, pre_parsed: bool) -> Self {
        self.scanner = self.scanner.pre_parsed(pre_parsed);
        self.selector = self.selector.pre_parsed(pre_parsed);
        self.provider = self.selector.provider(&self.parser_config);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn SyntaxTreeProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_rules(mut self, rule_repository: RuleRepository) -> Self {
        self.rule_repository = rule_repository;
        self
    }

    pub fn rules(&self) -> &RuleRepository {
        &self.rule_repository
    }

    /// Scan a file or a directory.
    ///
    /// A single file surfaces its error directly. In a directory, files that
    /// fail are recorded in [`ProjectScanReport::failures`] and the remaining
    /// files are still scanned.
    #[instrument(skip(self), fields(root = %root.display(), frontend = self.provider.name()))]
    pub async fn execute(&self, root: &Path) -> Result<ProjectScanReport, ScanError> {
        if !root.exists() {
            return Err(ScanError::NotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            let report = self.execute_file(root).await?;
            return Ok(ProjectScanReport {
                root: root.to_path_buf(),
                files_scanned: 1,
                files: vec![report],
                failures: Vec::new(),
            });
        }

        info!("Starting scan");
        let files = self.scanner.scan(root).map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        info!(file_count = files.len(), "Found files to scan");

        // one error for the whole directory instead of one per file
        if !files.is_empty() {
            self.provider.check_available().await?;
        }

        let results: Vec<(PathBuf, Result<ScanResult, ScanError>)> = stream::iter(files)
            .map(|file| async move {
                let result = self.scan_file(&file).await;
                (file.path, result)
            })
            .buffered(self.max_concurrent_files)
            .collect()
            .await;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (path, result) in results {
            match result {
                Ok(findings) => reports.push(FileScanReport { path, findings }),
                Err(error) => {
                    warn!(file = %path.display(), error = %error, "Failed to scan file");
                    failures.push(FileScanFailure { path, error });
                }
            }
        }

        let report = ProjectScanReport {
            root: root.to_path_buf(),
            files_scanned: reports.len(),
            files: reports,
            failures,
        };
        info!(
            files_scanned = report.files_scanned,
            failed = report.failures.len(),
            finding_count = report.finding_count(),
            "Scan completed"
        );
        Ok(report)
    }

    /// Scan one file
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn execute_file(&self, path: &Path) -> Result<FileScanReport, ScanError> {
        let file = self
            .scanner
            .classify(path)
            .ok_or_else(|| ScanError::UnsupportedFile(path.to_path_buf()))?;
        let findings = self.scan_file(&file).await?;
        Ok(FileScanReport {
            path: file.path,
            findings,
        })
    }

    async fn scan_file(&self, file: &ScanFile) -> Result<ScanResult, ScanError> {
        let path = file.path.as_path();
        let io_error = |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(limit) = self.max_file_size_bytes {
            let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
            if size > limit {
                return Err(ScanError::FileTooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }

        // invalid UTF-8 is replaced, not rejected
        let bytes = tokio::fs::read(path).await.map_err(io_error)?;
        let source = String::from_utf8_lossy(&bytes);
        debug!(file = %path.display(), bytes = bytes.len(), "Parsing file");

        let tree = self.provider.parse(path, &source, file.kind).await?;
        self.scan_tree(&tree)
    }

    /// Check tree limits, then run every rule over the tree
    pub fn scan_tree(&self, tree: &Value) -> Result<ScanResult, ScanError> {
        if let Value::Node(root) = tree {
            if self.max_tree_nodes.is_some() || self.max_tree_depth.is_some() {
                let stats = TreeStats::measure(root);
                debug!(nodes = stats.nodes, depth = stats.max_depth, "Measured syntax tree");
                if let Some(limit) = self.max_tree_nodes.filter(|limit| stats.nodes > *limit) {
                    return Err(ScanError::TreeTooLarge {
                        nodes: stats.nodes,
                        limit,
                    });
                }
                if let Some(limit) = self.max_tree_depth.filter(|limit| stats.max_depth > *limit) {
                    return Err(ScanError::TreeTooDeep {
                        depth: stats.max_depth,
                        limit,
                    });
                }
            }
        }

        Ok(traversal::scan(tree, self.rule_repository.get_all_rules())?)
    }
}

impl Default for ScanProjectUseCase {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan error
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, above the limit of {limit} bytes", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Syntax tree has {nodes} nodes, above the limit of {limit}")]
    TreeTooLarge { nodes: usize, limit: usize },

    #[error("Syntax tree is {depth} levels deep, above the limit of {limit}")]
    TreeTooDeep { depth: usize, limit: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    InvalidTree(#[from] InvalidTree),
}

fn serialize_display<S: Serializer>(error: &ScanError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
