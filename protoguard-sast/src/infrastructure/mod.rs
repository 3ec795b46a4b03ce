//! Analysis infrastructure
//!
//! - Traversal: pre-order walk applying every rule at every node
//! - Collector: deduplication and line ordering of findings
//! - Rules: the rule repository and the prototype-pollution rule
//! - Parsers: tree-sitter, espree and pre-parsed ESTree frontends
//! - Scanner: directory walking

pub mod collector;
pub mod estree;
pub mod parser_frontend;
pub mod parsers;
pub mod rules;
pub mod scanner;
pub mod traversal;

pub use collector::FindingCollector;
pub use parser_frontend::{ParserFrontend, ParserFrontendSelector};
pub use parsers::{ParseError, SyntaxTreeProvider};
pub use rules::{PrototypePollutionRule, RuleRepository};
pub use scanner::{DirectoryScanner, ScanFile};
pub use traversal::{InvalidTree, TreeStats, scan, scan_node, walk};
