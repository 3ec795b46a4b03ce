//! ESTree-shaped tree builders

use protoguard_sast::domain::{Node, SourceLocation};

pub fn at(node: Node, line: u32, column: u32) -> Node {
    node.with_location(SourceLocation::new(line, column))
}

pub fn ident(name: &str) -> Node {
    Node::new("Identifier").with_field("name", name)
}

pub fn string(value: &str) -> Node {
    Node::new("Literal")
        .with_field("value", value)
        .with_field("raw", format!("\"{}\"", value))
}

pub fn number(value: f64) -> Node {
    Node::new("Literal").with_field("value", value)
}

/// `object.property`
pub fn dot(object: Node, property: Node) -> Node {
    Node::new("MemberExpression")
        .with_field("object", object)
        .with_field("property", property)
        .with_field("computed", false)
}

/// `object[property]`
pub fn index(object: Node, property: Node) -> Node {
    Node::new("MemberExpression")
        .with_field("object", object)
        .with_field("property", property)
        .with_field("computed", true)
}

/// `left = right`
pub fn assign(left: Node, right: Node) -> Node {
    Node::new("AssignmentExpression")
        .with_field("operator", "=")
        .with_field("left", left)
        .with_field("right", right)
}

pub fn statement(expression: Node) -> Node {
    Node::new("ExpressionStatement").with_field("expression", expression)
}

pub fn program(body: Vec<Node>) -> Node {
    Node::new("Program")
        .with_field("sourceType", "module")
        .with_field("body", body)
}
