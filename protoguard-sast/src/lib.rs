//! Protoguard SAST - structural prototype-pollution detection for JavaScript
//!
//! A syntax tree (from tree-sitter, espree or a pre-parsed ESTree document) is
//! walked in pre-order and every [`Rule`](domain::Rule) is applied at every
//! node. Matches become [`Finding`](domain::Finding)s, which are deduplicated
//! and ordered by line.
//!
//! ## Usage
//!
//! ```rust
//! use protoguard_sast::domain::{Node, Value};
//! use protoguard_sast::infrastructure::{RuleRepository, scan};
//!
//! let tree = Value::Node(
//!     Node::new("AssignmentExpression").with_field(
//!         "left",
//!         Node::new("MemberExpression")
//!             .with_field("object", Node::new("Identifier").with_field("name", "obj"))
//!             .with_field("property", Node::new("Identifier").with_field("name", "__proto__"))
//!             .with_field("computed", false),
//!     ),
//! );
//!
//! let result = scan(&tree, RuleRepository::new().get_all_rules()).unwrap();
//! assert_eq!(result.findings()[0].snippet, "obj.__proto__");
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::use_cases::{
    FileScanFailure, FileScanReport, ProjectScanReport, ScanError, ScanProjectUseCase,
};
pub use domain::{Finding, Line, Node, Rule, ScanResult, Severity, SourceLocation, Value};
pub use infrastructure::{InvalidTree, ParseError, RuleRepository, SyntaxTreeProvider};
