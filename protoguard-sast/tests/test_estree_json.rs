//! Detection on espree-style ESTree JSON

use std::path::Path;

use protoguard_sast::domain::{Line, ScriptKind, Value};
use protoguard_sast::infrastructure::estree;
use protoguard_sast::infrastructure::parsers::{EstreeJsonFrontend, SyntaxTreeProvider};
use protoguard_sast::infrastructure::{RuleRepository, scan};

/// espree output for:
///
/// ```javascript
/// const a = 1;
/// obj["__proto__"] = payload;
/// ```
const ESPREE_AST: &str = r#"{
  "type": "Program",
  "start": 0,
  "end": 40,
  "range": [0, 40],
  "loc": {"start": {"line": 1, "column": 0}, "end": {"line": 2, "column": 27}},
  "body": [
    {
      "type": "VariableDeclaration",
      "loc": {"start": {"line": 1, "column": 0}, "end": {"line": 1, "column": 12}},
      "declarations": [
        {
          "type": "VariableDeclarator",
          "loc": {"start": {"line": 1, "column": 6}, "end": {"line": 1, "column": 11}},
          "id": {"type": "Identifier", "name": "a", "loc": {"start": {"line": 1, "column": 6}, "end": {"line": 1, "column": 7}}},
          "init": {"type": "Literal", "value": 1, "raw": "1", "loc": {"start": {"line": 1, "column": 10}, "end": {"line": 1, "column": 11}}}
        }
      ],
      "kind": "const"
    },
    {
      "type": "ExpressionStatement",
      "loc": {"start": {"line": 2, "column": 0}, "end": {"line": 2, "column": 27}},
      "expression": {
        "type": "AssignmentExpression",
        "operator": "=",
        "loc": {"start": {"line": 2, "column": 0}, "end": {"line": 2, "column": 26}},
        "left": {
          "type": "MemberExpression",
          "computed": true,
          "optional": false,
          "loc": {"start": {"line": 2, "column": 0}, "end": {"line": 2, "column": 16}},
          "object": {"type": "Identifier", "name": "obj", "loc": {"start": {"line": 2, "column": 0}, "end": {"line": 2, "column": 3}}},
          "property": {"type": "Literal", "value": "__proto__", "raw": "\"__proto__\"", "loc": {"start": {"line": 2, "column": 4}, "end": {"line": 2, "column": 15}}}
        },
        "right": {"type": "Identifier", "name": "payload", "loc": {"start": {"line": 2, "column": 19}, "end": {"line": 2, "column": 26}}}
      }
    }
  ],
  "sourceType": "module",
  "comments": [],
  "tokens": []
}"#;

#[tokio::test]
async fn test_espree_document_is_scanned() {
    let tree = EstreeJsonFrontend::new()
        .parse(Path::new("ast.json"), ESPREE_AST, ScriptKind::default())
        .await
        .unwrap();

    let result = scan(&tree, RuleRepository::new().get_all_rules()).unwrap();
    assert_eq!(result.len(), 1);
    let finding = &result.findings()[0];
    assert_eq!(finding.line, Line::Known(2));
    assert_eq!(finding.column, Some(4));
    assert_eq!(finding.property_name, "__proto__");
    assert_eq!(finding.snippet, "obj.__proto__");
}

#[test]
fn test_missing_locations_give_unknown_line() {
    let tree = estree::from_str(
        r#"{"type": "AssignmentExpression", "operator": "=",
            "left": {"type": "MemberExpression", "computed": false,
                     "object": {"type": "Identifier", "name": "o"},
                     "property": {"type": "Identifier", "name": "prototype"}},
            "right": {"type": "Literal", "value": null}}"#,
    )
    .unwrap();

    let result = scan(&tree, RuleRepository::new().get_all_rules()).unwrap();
    assert_eq!(result.findings()[0].line, Line::Unknown);
    assert_eq!(result.findings()[0].to_string(), "Line unknown: Access to 'prototype' → o.prototype");
}

#[test]
fn test_scalar_document_is_an_invalid_tree() {
    for document in ["42", "\"Program\"", "null", "[]", r#"{"body": []}"#] {
        let tree = estree::from_str(document).unwrap();
        assert!(!matches!(tree, Value::Node(_)));
        assert!(
            scan(&tree, RuleRepository::new().get_all_rules()).is_err(),
            "{} should be rejected",
            document
        );
    }
}
