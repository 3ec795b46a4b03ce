//! Assignment to a prototype-controlling property
//!
//! Matches `AssignmentExpression` nodes whose left side is a member access of
//! a sensitive property:
//!
//! ```javascript
//! obj.__proto__ = payload;           // identifier, not computed
//! obj["constructor"] = payload;      // string literal, computed
//! Foo.prototype = payload;
//! ```
//!
//! Computed access through a non-literal expression (`obj[key] = value`) is
//! not a structural match: whether `key` holds `"__proto__"` at runtime is a
//! data-flow question.

use crate::domain::{Finding, Line, Node, Rule, Severity};

pub const RULE_NAME: &str = "js-prototype-pollution";

/// Property names reported by default
pub const DEFAULT_SENSITIVE_PROPERTIES: &[&str] = &["__proto__", "constructor", "prototype"];

/// Placeholder used in snippets when the assigned object is not a plain identifier
pub const PLACEHOLDER_OBJECT: &str = "obj";

/// Detects assignments to sensitive object properties
#[derive(Debug, Clone)]
pub struct PrototypePollutionRule {
    properties: Vec<String>,
}

impl PrototypePollutionRule {
    pub fn new() -> Self {
        Self::with_properties(DEFAULT_SENSITIVE_PROPERTIES.iter().copied())
    }

    pub fn with_properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    fn is_sensitive(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }

    /// The member expression assigned to, when the node is an assignment
    fn assigned_member(node: &Node) -> Option<&Node> {
        if !node.is("AssignmentExpression") {
            return None;
        }
        node.child("left").filter(|left| left.is("MemberExpression"))
    }

    /// Property name accessed by `member`, following the literal/identifier split
    fn accessed_property<'a>(&self, member: &'a Node) -> Option<&'a str> {
        let property = member.child("property")?;
        let name = match property.kind() {
            "Literal" => property.field("value").as_str()?,
            "Identifier" if member.field("computed").as_bool() == Some(false) => {
                property.field("name").as_str()?
            }
            _ => return None,
        };
        self.is_sensitive(name).then_some(name)
    }
}

impl Default for PrototypePollutionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PrototypePollutionRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Assignment to __proto__, constructor or prototype can alter behavior shared by every object"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn matches(&self, node: &Node) -> bool {
        Self::assigned_member(node)
            .and_then(|member| self.accessed_property(member))
            .is_some()
    }

    fn extract(&self, node: &Node) -> Finding {
        let member = Self::assigned_member(node);
        let property_node = member.and_then(|m| m.child("property"));
        let location = property_node.and_then(Node::location);

        // Total over any node: on a matched node every lookup below succeeds.
        let property_name = member
            .and_then(|m| self.accessed_property(m))
            .unwrap_or_default()
            .to_string();

        let object_name = member
            .and_then(|m| m.child("object"))
            .filter(|object| object.is("Identifier"))
            .and_then(|object| object.field("name").as_str())
            .unwrap_or(PLACEHOLDER_OBJECT);

        Finding {
            rule_name: RULE_NAME.to_string(),
            line: Line::from(location.map(|l| l.line)),
            column: location.map(|l| l.column),
            snippet: format!("{}.{}", object_name, property_name),
            property_name,
            severity: self.severity(),
        }
    }
}
