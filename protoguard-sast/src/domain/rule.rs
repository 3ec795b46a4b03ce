//! Rule abstraction for structural pattern checks

use std::fmt;

use super::finding::{Finding, Severity};
use super::tree::Node;

/// A named structural check applied to every node of a tree.
///
/// `matches` must be pure and look only at the node it is given and the
/// fields below it; descending into the tree is the traversal engine's job.
/// `extract` is only called when `matches` returned true and must not fail
/// for such nodes.
pub trait Rule: Send + Sync {
    /// Identifier used in reports
    fn name(&self) -> &str;

    /// Human-readable explanation of what the rule reports
    fn description(&self) -> &str {
        ""
    }

    fn severity(&self) -> Severity {
        Severity::default()
    }

    fn matches(&self, node: &Node) -> bool;

    fn extract(&self, node: &Node) -> Finding;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("severity", &self.severity())
            .finish()
    }
}
