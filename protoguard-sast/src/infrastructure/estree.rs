//! ESTree JSON to tree model conversion
//!
//! - objects carrying a string `type` become nodes of that kind
//! - `loc.start` becomes the node location; the `loc` object itself is dropped
//! - arrays keep their node elements only (holes, numeric `range` pairs and
//!   other scalars inside arrays are dropped)
//! - objects without a `type` tag (e.g. `regex: {pattern, flags}`) are omitted
//! - strings, numbers, booleans and null are kept as scalar fields
//!
//! The resulting [`Value`] is handed to [`crate::infrastructure::traversal::scan`],
//! which rejects it when the root is not a node.

use serde_json::Value as Json;

use crate::domain::{Node, SourceLocation, Value};

/// Parse ESTree JSON text
pub fn from_str(text: &str) -> Result<Value, serde_json::Error> {
    let json: Json = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

/// Parse ESTree JSON bytes
pub fn from_slice(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    let json: Json = serde_json::from_slice(bytes)?;
    Ok(Value::from(json))
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Object(map) => match map.get("type") {
                Some(Json::String(_)) => Value::Node(node_from_object(map)),
                _ => Value::Absent,
            },
            Json::Array(items) => Value::Nodes(
                items
                    .into_iter()
                    .filter_map(|item| match Value::from(item) {
                        Value::Node(node) => Some(node),
                        _ => None,
                    })
                    .collect(),
            ),
            Json::String(s) => Value::String(s),
            Json::Number(n) => n.as_f64().map_or(Value::Absent, Value::Number),
            Json::Bool(b) => Value::Bool(b),
            Json::Null => Value::Null,
        }
    }
}

fn node_from_object(map: serde_json::Map<String, Json>) -> Node {
    let kind = map
        .get("type")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();
    let mut node = Node::new(kind);

    for (key, value) in map {
        match key.as_str() {
            "type" => {}
            "loc" => {
                if let Some(location) = start_location(&value) {
                    node = node.with_location(location);
                }
            }
            _ => node.set_field(key, Value::from(value)),
        }
    }
    node
}

fn start_location(loc: &Json) -> Option<SourceLocation> {
    let start = loc.get("start")?;
    let line = start.get("line")?.as_u64()?;
    let column = start.get("column").and_then(Json::as_u64).unwrap_or(0);
    Some(SourceLocation::new(
        u32::try_from(line).ok()?,
        u32::try_from(column).unwrap_or(u32::MAX),
    ))
}
