//! Language-agnostic syntax tree model
//!
//! A tree is made of [`Node`]s. Each node has a kind tag, an ordered list of
//! named fields holding [`Value`]s and an optional start location. Any field
//! holding a node or a list of nodes is a child edge; every other value is a
//! leaf attribute. Looking up a field that does not exist yields
//! [`Value::Absent`] instead of an error, so rule predicates decide what a
//! missing field means.

use serde::{Deserialize, Serialize};

static ABSENT: Value = Value::Absent;

/// Start position of a node in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-based line
    pub line: u32,
    /// 0-based column in UTF-16 code units, as ESTree producers report it
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Value stored in a node field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Node(Node),
    Nodes(Vec<Node>),
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    #[default]
    Absent,
}

impl Value {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Short description of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Node(_) => "node",
            Value::Nodes(_) => "node list",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Absent => "absent",
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<Vec<Node>> for Value {
    fn from(nodes: Vec<Node>) -> Self {
        Value::Nodes(nodes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Syntax tree node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: String,
    fields: Vec<(String, Value)>,
    location: Option<SourceLocation>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
            location: None,
        }
    }

    /// Set a field, replacing an earlier value of the same name in place.
    /// Absent values are not stored.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(index) = self.fields.iter().position(|(n, _)| *n == name) {
            if value.is_absent() {
                self.fields.remove(index);
            } else {
                self.fields[index].1 = value;
            }
        } else if !value.is_absent() {
            self.fields.push((name, value));
        }
    }

    /// Append a child under `name`, turning a single node into a list when
    /// the field repeats.
    pub fn push_child(&mut self, name: impl Into<String>, child: Node) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => {
                let merged = match std::mem::take(slot) {
                    Value::Node(existing) => Value::Nodes(vec![existing, child]),
                    Value::Nodes(mut nodes) => {
                        nodes.push(child);
                        Value::Nodes(nodes)
                    }
                    _ => Value::Node(child),
                };
                *slot = merged;
            }
            None => self.fields.push((name, Value::Node(child))),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    /// Field value by name, [`Value::Absent`] when missing
    pub fn field(&self, name: &str) -> &Value {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }

    /// Field as a node, `None` when missing or not a node
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.field(name).as_node()
    }

    /// All fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Child nodes in field order, list elements in list order
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.fields.iter().flat_map(|(_, value)| {
            let slice: &[Node] = match value {
                Value::Node(node) => std::slice::from_ref(node),
                Value::Nodes(nodes) => nodes,
                _ => &[],
            };
            slice.iter()
        })
    }
}

impl Drop for Node {
    // Release descendants through a work list; the derived drop glue would
    // recurse once per tree level.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.fields, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node.fields, &mut pending);
        }
    }
}

fn detach_children(fields: &mut [(String, Value)], out: &mut Vec<Node>) {
    for (_, value) in fields.iter_mut() {
        match std::mem::take(value) {
            Value::Node(node) => out.push(node),
            Value::Nodes(nodes) => out.extend(nodes),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::new("Identifier").with_field("name", name)
    }

    #[test]
    fn test_missing_field_is_absent() {
        let node = ident("x");
        assert!(node.field("object").is_absent());
        assert!(node.child("object").is_none());
        assert_eq!(node.field("name").as_str(), Some("x"));
    }

    #[test]
    fn test_children_follow_field_then_list_order() {
        let node = Node::new("Program")
            .with_field("sourceType", "module")
            .with_field("head", ident("a"))
            .with_field("body", vec![ident("b"), ident("c")])
            .with_field("tail", ident("d"));

        let names: Vec<&str> = node
            .children()
            .filter_map(|c| c.field("name").as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_set_field_replaces_in_place() {
        let node = Node::new("MemberExpression")
            .with_field("object", ident("a"))
            .with_field("computed", false)
            .with_field("object", ident("b"));

        let order: Vec<&str> = node.fields().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["object", "computed"]);
        assert_eq!(
            node.child("object").and_then(|o| o.field("name").as_str()),
            Some("b")
        );
    }

    #[test]
    fn test_absent_value_removes_field() {
        let node = ident("x").with_field("name", Value::Absent);
        assert_eq!(node.fields().count(), 0);
    }

    #[test]
    fn test_push_child_promotes_to_list() {
        let mut node = Node::new("SequenceExpression");
        node.push_child("expressions", ident("a"));
        node.push_child("expressions", ident("b"));
        node.push_child("expressions", ident("c"));

        match node.field("expressions") {
            Value::Nodes(nodes) => assert_eq!(nodes.len(), 3),
            other => panic!("expected node list, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_dropping_deep_tree_does_not_overflow() {
        let mut node = ident("leaf");
        for _ in 0..200_000 {
            node = Node::new("UnaryExpression").with_field("argument", node);
        }
        drop(node);
    }
}
