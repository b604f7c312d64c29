//! Lowering of tree-sitter-javascript nodes into ESTree-shaped JSON.
//!
//! Only the node kinds that module patterns look at get a dedicated ESTree
//! shape. Every other kind is kept generically as `{type, children}` so
//! that containment searches still see the whole program.

use super::stack::ensure_sufficient_stack;
use serde_json::{json, Map, Number, Value};
use tree_sitter::Node;

/// Converts tree-sitter nodes of one source buffer.
pub struct Lowerer<'s> {
    source: &'s [u8],
}

impl<'s> Lowerer<'s> {
    /// Create a lowerer over the bytes the tree was parsed from.
    pub fn new(source: &'s [u8]) -> Self {
        Self { source }
    }

    /// Lower a node and its subtree.
    pub fn lower(&self, node: Node) -> Value {
        ensure_sufficient_stack(|| self.lower_node(node))
    }

    fn lower_node(&self, node: Node) -> Value {
        match node.kind() {
            "program" => self.list("Program", "body", node),
            "expression_statement" => self.expression_statement(node),
            "parenthesized_expression" => self.first_named_child(node),
            "call_expression" => self.call("CallExpression", "function", node),
            "new_expression" => self.call("NewExpression", "constructor", node),
            "member_expression" => self.member("property", false, node),
            "subscript_expression" => self.member("index", true, node),
            "identifier"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "private_property_identifier"
            | "this"
            | "undefined" => self.identifier(node),
            "string" => self.string_literal(node),
            "number" => self.number_literal(node),
            "true" | "false" => self.boolean_literal(node),
            "null" => json!({ "type": "Literal", "value": null, "raw": "null" }),
            "array" => self.list("ArrayExpression", "elements", node),
            "object" => self.object(node),
            "assignment_expression" => self.assignment("=", node),
            "augmented_assignment_expression" => {
                let operator = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op))
                    .unwrap_or_default();
                self.assignment(operator, node)
            }
            "variable_declaration" => self.declaration("var", node),
            "lexical_declaration" => {
                let kind = node
                    .child_by_field_name("kind")
                    .map(|k| self.text(k))
                    .unwrap_or("let");
                self.declaration(kind, node)
            }
            "variable_declarator" => self.declarator(node),
            "function_declaration" | "generator_function_declaration" => {
                self.function("FunctionDeclaration", node)
            }
            "function" | "function_expression" | "generator_function" => {
                self.function("FunctionExpression", node)
            }
            "arrow_function" => self.arrow_function(node),
            "statement_block" => self.list("BlockStatement", "body", node),
            "return_statement" => self.return_statement(node),
            kind => self.list(&pascal_case(kind), "children", node),
        }
    }

    fn list(&self, estree_type: &str, key: &str, node: Node) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::from(estree_type));
        object.insert(key.to_string(), self.named_children(node));
        Value::Object(object)
    }

    fn expression_statement(&self, node: Node) -> Value {
        json!({
            "type": "ExpressionStatement",
            "expression": self.first_named_child(node),
        })
    }

    fn call(&self, estree_type: &str, callee: &str, node: Node) -> Value {
        json!({
            "type": estree_type,
            "callee": self.field(node, callee),
            "arguments": self.arguments(node),
        })
    }

    fn member(&self, property: &str, computed: bool, node: Node) -> Value {
        json!({
            "type": "MemberExpression",
            "object": self.field(node, "object"),
            "property": self.field(node, property),
            "computed": computed,
        })
    }

    fn identifier(&self, node: Node) -> Value {
        json!({ "type": "Identifier", "name": self.text(node) })
    }

    fn string_literal(&self, node: Node) -> Value {
        json!({
            "type": "Literal",
            "value": self.string_value(node),
            "raw": self.text(node),
        })
    }

    fn number_literal(&self, node: Node) -> Value {
        json!({
            "type": "Literal",
            "value": parse_number(self.text(node)),
            "raw": self.text(node),
        })
    }

    fn boolean_literal(&self, node: Node) -> Value {
        json!({
            "type": "Literal",
            "value": node.kind() == "true",
            "raw": self.text(node),
        })
    }

    fn object(&self, node: Node) -> Value {
        json!({ "type": "ObjectExpression", "properties": self.properties(node) })
    }

    fn assignment(&self, operator: &str, node: Node) -> Value {
        json!({
            "type": "AssignmentExpression",
            "operator": operator,
            "left": self.field(node, "left"),
            "right": self.field(node, "right"),
        })
    }

    fn declaration(&self, kind: &str, node: Node) -> Value {
        json!({
            "type": "VariableDeclaration",
            "kind": kind,
            "declarations": self.named_children(node),
        })
    }

    fn declarator(&self, node: Node) -> Value {
        json!({
            "type": "VariableDeclarator",
            "id": self.field(node, "name"),
            "init": self.field(node, "value"),
        })
    }

    fn arrow_function(&self, node: Node) -> Value {
        let params = match node.child_by_field_name("parameter") {
            Some(single) => Value::Array(vec![self.lower(single)]),
            None => self.params(node),
        };
        json!({
            "type": "ArrowFunctionExpression",
            "id": null,
            "params": params,
            "body": self.field(node, "body"),
        })
    }

    fn return_statement(&self, node: Node) -> Value {
        json!({
            "type": "ReturnStatement",
            "argument": self.first_named_child(node),
        })
    }

    fn function(&self, estree_type: &str, node: Node) -> Value {
        json!({
            "type": estree_type,
            "id": self.field(node, "name"),
            "params": self.params(node),
            "body": self.field(node, "body"),
        })
    }

    fn params(&self, node: Node) -> Value {
        node.child_by_field_name("parameters")
            .map(|params| self.named_children(params))
            .unwrap_or_else(|| Value::Array(Vec::new()))
    }

    fn arguments(&self, node: Node) -> Value {
        match node.child_by_field_name("arguments") {
            Some(args) if args.kind() == "arguments" => self.named_children(args),
            Some(other) => Value::Array(vec![self.lower(other)]),
            None => Value::Array(Vec::new()),
        }
    }

    fn properties(&self, node: Node) -> Value {
        let mut cursor = node.walk();
        let properties = node
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .map(|child| match child.kind() {
                "pair" => {
                    let key = match child.child_by_field_name("key") {
                        Some(key) if key.kind() == "computed_property_name" => {
                            self.first_named_child(key)
                        }
                        Some(key) => self.lower(key),
                        None => Value::Null,
                    };
                    json!({
                        "type": "Property",
                        "key": key,
                        "value": self.field(child, "value"),
                    })
                }
                "shorthand_property_identifier" => {
                    let id = self.lower(child);
                    json!({ "type": "Property", "key": id.clone(), "value": id, "shorthand": true })
                }
                _ => self.lower(child),
            })
            .collect();
        Value::Array(properties)
    }

    fn field(&self, node: Node, name: &str) -> Value {
        node.child_by_field_name(name)
            .map(|child| self.lower(child))
            .unwrap_or(Value::Null)
    }

    fn first_named_child(&self, node: Node) -> Value {
        let mut cursor = node.walk();
        let first = node
            .named_children(&mut cursor)
            .find(|child| !child.is_extra());
        first.map(|child| self.lower(child)).unwrap_or(Value::Null)
    }

    fn named_children(&self, node: Node) -> Value {
        let mut cursor = node.walk();
        let children = node
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .map(|child| self.lower(child))
            .collect();
        Value::Array(children)
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    /// Decoded value of a `string` node.
    ///
    /// Built from UTF-16 code units so that escaped surrogate pairs combine
    /// into one character. Unpaired surrogates become U+FFFD.
    fn string_value(&self, node: Node) -> String {
        let mut units = Vec::new();
        let mut cursor = node.walk();
        for part in node.named_children(&mut cursor) {
            match part.kind() {
                "string_fragment" => units.extend(self.text(part).encode_utf16()),
                "escape_sequence" => decode_escape(self.text(part), &mut units),
                _ => {}
            }
        }
        String::from_utf16_lossy(&units)
    }
}

fn push_char(out: &mut Vec<u16>, c: char) {
    let mut buf = [0u16; 2];
    out.extend_from_slice(c.encode_utf16(&mut buf));
}

fn decode_escape(escape: &str, out: &mut Vec<u16>) {
    let body = escape.strip_prefix('\\').unwrap_or(escape);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return;
    };
    let rest = chars.as_str();
    let decoded = match first {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'v' => '\u{b}',
        '0' if rest.is_empty() => '\0',
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => return,
        'u' if !rest.starts_with('{') => {
            // A single code unit, possibly half of a surrogate pair.
            match u16::from_str_radix(rest, 16) {
                Ok(unit) => out.push(unit),
                Err(_) => out.extend(escape.encode_utf16()),
            }
            return;
        }
        'x' | 'u' => {
            let hex = rest.trim_start_matches('{').trim_end_matches('}');
            match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                Some(c) => c,
                None => {
                    out.extend(escape.encode_utf16());
                    return;
                }
            }
        }
        other => other,
    };
    push_char(out, decoded);
}

fn parse_number(raw: &str) -> Value {
    let cleaned = raw.replace('_', "");
    let radix = match cleaned.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return i64::from_str_radix(&cleaned[2..], radix)
            .map(Value::from)
            .unwrap_or(Value::Null);
    }
    if let Ok(int) = cleaned.parse::<i64>() {
        return Value::from(int);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn pascal_case(kind: &str) -> String {
    kind.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
