//! Depth-first traversal engine
//!
//! Visits every node of a tree exactly once in pre-order (parent before
//! children, children in field order then list order) and applies every rule
//! at each node. The walk is driven by an explicit stack so native stack
//! usage does not grow with tree depth. Trees are trusted to be acyclic;
//! shared or cyclic structure is not detected.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::{Node, Rule, ScanResult, Value};
use crate::infrastructure::collector::FindingCollector;

/// Raised when the supplied tree does not have a node at its root
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid syntax tree: {reason}")]
pub struct InvalidTree {
    pub reason: String,
}

impl InvalidTree {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Pre-order iterator over a tree
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // reversed so the first child is popped next
        self.stack.extend(node.children().rev());
        Some(node)
    }
}

/// Walk `root` and all its descendants in pre-order
pub fn walk(root: &Node) -> PreOrder<'_> {
    PreOrder { stack: vec![root] }
}

/// Size figures for a tree, used to bound work before a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub nodes: usize,
    /// Depth of the deepest node, the root being at depth 1
    pub max_depth: usize,
}

impl TreeStats {
    pub fn measure(root: &Node) -> Self {
        let mut stats = TreeStats::default();
        let mut stack = vec![(root, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(depth);
            stack.extend(node.children().map(|child| (child, depth + 1)));
        }
        stats
    }
}

/// Scan a tree whose root still has to be checked for being a node
pub fn scan(root: &Value, rules: &[Arc<dyn Rule>]) -> Result<ScanResult, InvalidTree> {
    match root {
        Value::Node(node) => Ok(scan_node(node, rules)),
        other => Err(InvalidTree::new(format!(
            "expected a node at the root, found {}",
            other.type_name()
        ))),
    }
}

/// Scan a tree rooted at `root` with `rules`, applied in the given order
#[instrument(skip_all, fields(root_kind = %root.kind(), rule_count = rules.len()))]
pub fn scan_node(root: &Node, rules: &[Arc<dyn Rule>]) -> ScanResult {
    let mut collector = FindingCollector::new();
    let mut visited = 0usize;

    for node in walk(root) {
        visited += 1;
        for rule in rules {
            if rule.matches(node) {
                let finding = rule.extract(node);
                trace!(
                    rule = rule.name(),
                    kind = node.kind(),
                    line = %finding.line,
                    "Rule matched"
                );
                collector.push(finding);
            }
        }
    }

    let duplicates = collector.duplicates();
    let result = collector.finish();
    debug!(
        nodes_visited = visited,
        finding_count = result.len(),
        duplicates,
        "Traversal completed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Finding, Line, Severity};

    fn named(kind: &str, name: &str) -> Node {
        Node::new(kind).with_field("name", name)
    }

    /// Matches every node and records its name in the snippet
    struct RecordAll;

    impl Rule for RecordAll {
        fn name(&self) -> &str {
            "record-all"
        }

        fn matches(&self, _node: &Node) -> bool {
            true
        }

        fn extract(&self, node: &Node) -> Finding {
            Finding {
                rule_name: self.name().to_string(),
                line: Line::Unknown,
                column: None,
                property_name: String::new(),
                snippet: node.field("name").as_str().unwrap_or("").to_string(),
                severity: Severity::Info,
            }
        }
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = named("A", "a")
            .with_field("first", named("B", "b").with_field("inner", named("C", "c")))
            .with_field("rest", vec![named("D", "d"), named("E", "e")])
            .with_field("flag", true);

        let order: Vec<&str> = walk(&tree).map(|n| n.kind()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_scan_applies_rules_in_pre_order() {
        let tree = named("A", "a").with_field("body", vec![named("B", "b"), named("C", "c")]);
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(RecordAll)];

        let result = scan_node(&tree, &rules);
        let snippets: Vec<&str> = result.iter().map(|f| f.snippet.as_str()).collect();
        assert_eq!(snippets, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_scan_rejects_non_node_root() {
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(RecordAll)];
        let err = scan(&Value::Number(42.0), &rules).unwrap_err();
        assert!(err.reason.contains("number"));
        assert!(scan(&Value::Absent, &rules).is_err());
        assert!(scan(&Value::Nodes(vec![named("A", "a")]), &rules).is_err());
    }

    #[test]
    fn test_tree_stats() {
        let tree = named("A", "a")
            .with_field("left", named("B", "b").with_field("x", named("C", "c")))
            .with_field("right", named("D", "d"));

        assert_eq!(
            TreeStats::measure(&tree),
            TreeStats {
                nodes: 4,
                max_depth: 3
            }
        );
    }

    #[test]
    fn test_deep_tree_is_walked_without_recursion() {
        let depth = 100_000;
        let mut node = named("Identifier", "x");
        for _ in 0..depth {
            node = Node::new("UnaryExpression").with_field("argument", node);
        }

        assert_eq!(walk(&node).count(), depth + 1);
        assert_eq!(TreeStats::measure(&node).max_depth, depth + 1);
    }
}
