//! JavaScript parsing into ESTree-shaped parse trees.
//!
//! Sources are parsed with tree-sitter-javascript and lowered into a
//! `serde_json::Value` tree: every node is an object with a `type`
//! discriminator and its child fields in source order. The pattern
//! matcher and the tree walker operate on this representation only.

pub mod lower;
pub mod stack;
pub mod walk;

use serde_json::{json, Map, Value};

/// An immutable, JSON-serializable syntax tree.
pub type ParseTree = Value;

/// Deepest syntax nesting that is lowered into a [`ParseTree`].
///
/// Sources nested deeper are treated like sources with syntax errors.
pub const MAX_NESTING: usize = 512;

/// The tree produced for sources that cannot be parsed.
pub fn empty_program() -> ParseTree {
    json!({ "type": "Program", "body": [] })
}

/// Parse JavaScript source into a [`ParseTree`].
///
/// Parse failure is not an error: a source that tree-sitter cannot parse
/// cleanly, or that nests deeper than [`MAX_NESTING`], yields an empty
/// `Program`, so that classification degrades to "unknown" instead of
/// aborting the caller.
///
/// # Examples
///
/// ```
/// # use jsdepend::syntax::parse_javascript;
/// let tree = parse_javascript("require('fs');");
/// assert_eq!(tree["type"], "Program");
/// assert_eq!(tree["body"][0]["expression"]["type"], "CallExpression");
/// ```
pub fn parse_javascript(source: &str) -> ParseTree {
    let mut parser = tree_sitter::Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_javascript::language()) {
        log::error!("Failed to set JavaScript language: {:?}", e);
        return empty_program();
    }

    let Some(tree) = parser.parse(source, None) else {
        log::debug!("Parse failed - no tree returned");
        return empty_program();
    };

    let root = tree.root_node();
    if root.has_error() {
        log::debug!("Source has syntax errors, using empty tree");
        return empty_program();
    }

    if nesting_exceeds(root, MAX_NESTING) {
        log::debug!("Source nests deeper than {} levels, using empty tree", MAX_NESTING);
        return empty_program();
    }

    lower::Lowerer::new(source.as_bytes()).lower(root)
}

/// Whether any node of the tree sits more than `limit` levels below `root`.
fn nesting_exceeds(root: tree_sitter::Node, limit: usize) -> bool {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        if depth > limit {
            return true;
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
            depth -= 1;
        }
    }
}

/// Type discriminator of a node, if it is one.
pub fn node_type(node: &Value) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

/// Evaluate a literal-only expression into plain JSON.
///
/// Handles `Literal`, `ArrayExpression` and `ObjectExpression` nodes whose
/// leaves are all literals. Anything else (identifiers, calls, functions)
/// makes the whole expression non-literal and yields `None`.
pub fn literal_value(node: &Value) -> Option<Value> {
    match node_type(node)? {
        "Literal" => node.get("value").cloned(),
        "ArrayExpression" => node
            .get("elements")?
            .as_array()?
            .iter()
            .map(literal_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        "ObjectExpression" => {
            let mut object = Map::new();
            for property in node.get("properties")?.as_array()? {
                if node_type(property)? != "Property" {
                    return None;
                }
                let key = property_key(property.get("key")?)?;
                object.insert(key, literal_value(property.get("value")?)?);
            }
            Some(Value::Object(object))
        }
        _ => None,
    }
}

fn property_key(key: &Value) -> Option<String> {
    match node_type(key)? {
        "Identifier" => key.get("name")?.as_str().map(str::to_string),
        "Literal" => match key.get("value")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
        _ => None,
    }
}
