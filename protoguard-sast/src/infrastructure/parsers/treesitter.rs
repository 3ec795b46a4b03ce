//! In-process JavaScript parsing with tree-sitter
//!
//! The concrete syntax tree is converted into the ESTree-shaped tree model:
//!
//! | tree-sitter                                   | tree model                                   |
//! |-----------------------------------------------|----------------------------------------------|
//! | `assignment_expression`                       | `AssignmentExpression { operator: "=" }`     |
//! | `augmented_assignment_expression`             | `AssignmentExpression { operator }`          |
//! | `member_expression`                           | `MemberExpression { computed: false }`       |
//! | `subscript_expression` (`index` field)        | `MemberExpression { computed: true, property }` |
//! | `identifier`, `property_identifier`, ...      | `Identifier { name }`                        |
//! | `string`, `number`, `true`, `false`, `null`   | `Literal { value, raw }`                     |
//! | `parenthesized_expression`                    | its inner expression                         |
//! | comments                                      | dropped                                      |
//! | anything else (`call_expression`)             | PascalCase kind (`CallExpression`)           |
//!
//! Children without a grammar field name are stored under `body` for
//! programs and blocks, `expression` for expression statements, and
//! `children` everywhere else. Columns count UTF-16 code units within the line,
//! as espree reports them.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use super::{ParseError, SyntaxTreeProvider};
use crate::domain::{Node, ScriptKind, SourceLocation, Value};

/// tree-sitter kinds converted to `Identifier`
const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "property_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
    "statement_identifier",
    "undefined",
];

/// Kinds whose ESTree name is not the PascalCase of the tree-sitter name
const KIND_RENAMES: &[(&str, &str)] = &[
    ("assignment_expression", "AssignmentExpression"),
    ("augmented_assignment_expression", "AssignmentExpression"),
    ("subscript_expression", "MemberExpression"),
    ("lexical_declaration", "VariableDeclaration"),
    ("statement_block", "BlockStatement"),
    ("arrow_function", "ArrowFunctionExpression"),
    ("function_expression", "FunctionExpression"),
    ("object", "ObjectExpression"),
    ("array", "ArrayExpression"),
    ("pair", "Property"),
    ("this", "ThisExpression"),
    ("super", "Super"),
];

/// tree-sitter JavaScript frontend
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterFrontend;

impl TreeSitterFrontend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SyntaxTreeProvider for TreeSitterFrontend {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    #[instrument(skip(self, source), fields(path = %path.display(), source_len = source.len()))]
    async fn parse(&self, path: &Path, source: &str, kind: ScriptKind) -> Result<Value, ParseError> {
        let owned_path = path.to_path_buf();
        let owned_source = source.to_string();

        // parsing and conversion are CPU bound
        tokio::task::spawn_blocking(move || parse_source(&owned_path, &owned_source, kind))
            .await
            .map_err(|e| {
                error!(error = %e, "tree-sitter parse task panicked");
                ParseError::failed(path, "parser task failed")
            })?
            .map(Value::Node)
    }
}

/// Parse `source` and convert it into a `Program` node
pub fn parse_source(path: &Path, source: &str, kind: ScriptKind) -> Result<Node, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .map_err(|e| {
            error!(error = %e, "Failed to load JavaScript grammar");
            ParseError::FrontendUnavailable(format!("Failed to load JavaScript grammar: {}", e))
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::failed(path, "tree-sitter produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let message = match first_error(root) {
            Some(point) => format!("syntax error at line {}, column {}", point.row + 1, point.column),
            None => "syntax error".to_string(),
        };
        debug!(%message, "JavaScript source has syntax errors");
        return Err(ParseError::failed(path, message));
    }

    let program = TreeBuilder::new(source.as_bytes(), kind)
        .build(&tree)
        .ok_or_else(|| ParseError::failed(path, "empty syntax tree"))?;
    debug!(root_kind = program.kind(), "JavaScript AST converted");
    Ok(program)
}

/// Position of the first ERROR or MISSING node
fn first_error(root: tree_sitter::Node<'_>) -> Option<tree_sitter::Point> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node.start_position());
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// A node under construction
enum Frame {
    Element {
        node: Node,
        field: Option<&'static str>,
        unnamed: &'static str,
    },
    /// Parentheses: forwards its first child to the enclosing element
    Transparent {
        field: Option<&'static str>,
        inner: Option<Node>,
    },
}

struct TreeBuilder<'s> {
    source: &'s [u8],
    kind: ScriptKind,
    stack: Vec<Frame>,
    root: Option<Node>,
    columns: Utf16Columns,
}

/// Converts tree-sitter byte columns into UTF-16 code units.
///
/// Nodes are entered in pre-order, so start bytes never decrease and counting
/// resumes from the previous node when it sits on the same line.
#[derive(Debug, Default)]
struct Utf16Columns {
    line_start: usize,
    byte: usize,
    units: usize,
}

impl Utf16Columns {
    fn column(&mut self, source: &[u8], line_start: usize, byte: usize) -> usize {
        if line_start != self.line_start || byte < self.byte {
            self.line_start = line_start;
            self.byte = line_start;
            self.units = 0;
        }
        let span = source.get(self.byte..byte).unwrap_or_default();
        self.units += String::from_utf8_lossy(span).encode_utf16().count();
        self.byte = byte;
        self.units
    }
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s [u8], kind: ScriptKind) -> Self {
        Self {
            source,
            kind,
            stack: Vec::new(),
            root: None,
            columns: Utf16Columns::default(),
        }
    }

    /// Convert with a cursor walk; every node that is descended into pushed a
    /// frame, which is closed when the cursor returns to it.
    fn build(mut self, tree: &tree_sitter::Tree) -> Option<Node> {
        let mut cursor = tree.walk();
        loop {
            let descend = self.enter(cursor.node(), cursor.field_name());
            if descend {
                if cursor.goto_first_child() {
                    continue;
                }
                self.close();
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return self.root;
                }
                self.close();
            }
        }
    }

    /// Handle a node; returns true when a frame was pushed for it
    fn enter(&mut self, ts: tree_sitter::Node<'_>, field: Option<&'static str>) -> bool {
        if ts.is_extra() {
            return false;
        }

        let text = ts.utf8_text(self.source).unwrap_or_default();

        if !ts.is_named() {
            // operator tokens carry a field name; punctuation does not
            if let (Some(field), Some(Frame::Element { node, .. })) = (field, self.stack.last_mut()) {
                node.set_field(field, text);
            }
            return false;
        }

        let location = self.location(ts);
        let kind = ts.kind();

        if kind == "parenthesized_expression" {
            self.stack.push(Frame::Transparent { field, inner: None });
            return true;
        }

        if IDENTIFIER_KINDS.contains(&kind) {
            let node = Node::new("Identifier")
                .with_field("name", text)
                .with_location(location);
            self.attach(field, node);
            return false;
        }

        if kind == "private_property_identifier" {
            let node = Node::new("PrivateIdentifier")
                .with_field("name", text.trim_start_matches('#'))
                .with_location(location);
            self.attach(field, node);
            return false;
        }

        if let Some(value) = literal_value(kind, text) {
            let node = Node::new("Literal")
                .with_field("value", value)
                .with_field("raw", text)
                .with_location(location);
            self.attach(field, node);
            return false;
        }

        let mut node = Node::new(estree_kind(kind)).with_location(location);
        let unnamed = match kind {
            "program" => {
                node.set_field("sourceType", self.kind.source_type.as_str());
                "body"
            }
            "statement_block" | "class_body" => "body",
            "expression_statement" => "expression",
            "assignment_expression" => {
                node.set_field("operator", "=");
                "children"
            }
            "member_expression" => {
                node.set_field("computed", false);
                "children"
            }
            "subscript_expression" => {
                node.set_field("computed", true);
                "children"
            }
            _ => "children",
        };
        self.stack.push(Frame::Element {
            node,
            field,
            unnamed,
        });
        true
    }

    fn attach(&mut self, field: Option<&'static str>, child: Node) {
        match self.stack.last_mut() {
            None => self.root = Some(child),
            Some(Frame::Element { node, unnamed, .. }) => {
                let name = match field {
                    Some("index") if node.is("MemberExpression") => "property",
                    Some(name) => name,
                    None => unnamed,
                };
                node.push_child(name, child);
            }
            Some(Frame::Transparent { inner, .. }) => {
                if inner.is_none() {
                    *inner = Some(child);
                }
            }
        }
    }

    fn location(&mut self, ts: tree_sitter::Node<'_>) -> SourceLocation {
        let point = ts.start_position();
        let start = ts.start_byte();
        let column = self
            .columns
            .column(self.source, start.saturating_sub(point.column), start);
        SourceLocation::new(
            u32::try_from(point.row).unwrap_or(u32::MAX).saturating_add(1),
            u32::try_from(column).unwrap_or(u32::MAX),
        )
    }

    fn close(&mut self) {
        let (field, node) = match self.stack.pop() {
            Some(Frame::Element { node, field, .. }) => (field, Some(node)),
            Some(Frame::Transparent { field, inner }) => (field, inner),
            None => return,
        };
        if let Some(node) = node {
            self.attach(field, node);
        }
    }
}

fn estree_kind(kind: &str) -> String {
    KIND_RENAMES
        .iter()
        .find(|(from, _)| *from == kind)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| pascal_case(kind))
}

fn pascal_case(kind: &str) -> String {
    kind.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `Literal.value` for literal kinds, `None` for every other kind
fn literal_value(kind: &str, text: &str) -> Option<Value> {
    let value = match kind {
        "string" => Value::String(decode_string(text)),
        "number" => parse_number(text).map_or(Value::Absent, Value::Number),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        // ESTree keeps the pattern in a separate `regex` object
        "regex" => Value::Absent,
        _ => return None,
    };
    Some(value)
}

/// Numeric value of a JavaScript number literal
fn parse_number(raw: &str) -> Option<f64> {
    let digits: String = raw
        .trim_end_matches('n')
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let lower = digits.to_ascii_lowercase();
    let radix = |digits: &str, radix: u32| u64::from_str_radix(digits, radix).ok().map(|v| v as f64);

    if let Some(hex) = lower.strip_prefix("0x") {
        radix(hex, 16)
    } else if let Some(octal) = lower.strip_prefix("0o") {
        radix(octal, 8)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        radix(binary, 2)
    } else if lower.len() > 1 && lower.starts_with('0') && lower.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        // legacy octal, e.g. 0755
        radix(&lower[1..], 8)
    } else {
        lower.parse::<f64>().ok()
    }
}

/// Cooked value of a quoted string literal
fn decode_string(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = chars.next();
    let body = chars.as_str();
    let body = match quote {
        Some(q) => body.strip_suffix(q).unwrap_or(body),
        None => body,
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            break;
        };
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => out.push('\0'),
            'x' => match read_hex(&mut chars, 2) {
                Some(code) => out.push(char::from_u32(code).unwrap_or('\u{fffd}')),
                None => out.push('x'),
            },
            'u' => out.push(read_unicode_escape(&mut chars)),
            // line continuation
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    out
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn read_hex(chars: &mut Chars<'_>, len: usize) -> Option<u32> {
    let mut lookahead = chars.clone();
    let digits: String = lookahead.by_ref().take(len).collect();
    if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    *chars = lookahead;
    u32::from_str_radix(&digits, 16).ok()
}

/// Body of a `\u` escape: `XXXX`, `{X...}`, or a `\uD83D\uDE00` surrogate pair
fn read_unicode_escape(chars: &mut Chars<'_>) -> char {
    if chars.peek() == Some(&'{') {
        let mut lookahead = chars.clone();
        lookahead.next();
        let digits: String = lookahead.by_ref().take_while(|c| *c != '}').collect();
        return match u32::from_str_radix(&digits, 16) {
            Ok(code) => {
                *chars = lookahead;
                char::from_u32(code).unwrap_or('\u{fffd}')
            }
            Err(_) => 'u',
        };
    }

    let Some(high) = read_hex(chars, 4) else {
        return 'u';
    };
    if (0xD800..0xDC00).contains(&high) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = read_hex(&mut lookahead, 4).filter(|low| (0xDC00..0xE000).contains(low)) {
                *chars = lookahead;
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(code).unwrap_or('\u{fffd}');
            }
        }
    }
    char::from_u32(high).unwrap_or('\u{fffd}')
}
