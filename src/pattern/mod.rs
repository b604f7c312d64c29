//! Backtracking pattern matching over parse trees.
//!
//! A [`Pattern`] describes a shape. Matching a pattern against a tree
//! enumerates solutions left to right: when an enclosing pattern rejects a
//! solution (a missing projected field, a later conjunct failing), the
//! search resumes where the rejected solution was found. The first
//! accepted solution is returned as a [`MatchResult`].
//!
//! Values captured by [`Variable`]s travel in the result's [`Bindings`].
//! Patterns are never mutated by matching, so one pattern can be reused,
//! nested inside itself or shared between threads.
//!
//! # Example
//!
//! ```
//! # use jsdepend::pattern::*;
//! # use serde_json::json;
//! let name = Variable::typed(ValueKind::String);
//! let pattern = contains_pat(object_pat([
//!     ("type", Pattern::from("Identifier")),
//!     ("name", name.pattern()),
//! ]));
//!
//! let tree = json!({ "type": "Program", "body": [{ "type": "Identifier", "name": "x" }] });
//! let result = pattern.matches(&tree);
//! assert_eq!(result.get_str(&name), Some("x"));
//! ```

pub mod estree;

use crate::syntax::stack::ensure_sufficient_stack;
use crate::syntax::walk::{abortable_walk, Step};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Primitive value kinds a [`Variable`] can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
}

impl ValueKind {
    fn admits(self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Boolean => value.is_boolean(),
        }
    }
}

static NEXT_VARIABLE: AtomicU64 = AtomicU64::new(0);

/// A capture slot. Matching [`Variable::pattern`] always succeeds (subject
/// to the optional type filter) and binds the matched value to this
/// variable in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    id: u64,
    filter: Option<ValueKind>,
}

impl Variable {
    /// A variable accepting any value.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            id: NEXT_VARIABLE.fetch_add(1, Ordering::Relaxed),
            filter: None,
        }
    }

    /// A variable accepting only values of the given kind.
    pub fn typed(kind: ValueKind) -> Self {
        Self {
            filter: Some(kind),
            ..Self::new()
        }
    }

    /// The pattern that binds this variable.
    pub fn pattern(&self) -> Pattern {
        Pattern::Variable(*self)
    }
}

/// Values captured by variables during one match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings<'t> {
    entries: Vec<(u64, &'t Value)>,
}

impl<'t> Bindings<'t> {
    /// Value bound to `var`, the innermost binding winning.
    pub fn get(&self, var: &Variable) -> Option<&'t Value> {
        self.entries
            .iter()
            .rev()
            .find(|(id, _)| *id == var.id)
            .map(|(_, value)| *value)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn with(&self, var: &Variable, value: &'t Value) -> Self {
        let mut entries = self.entries.clone();
        entries.push((var.id, value));
        Self { entries }
    }
}

/// Outcome of matching a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult<'t> {
    /// The pattern matched.
    Matched {
        /// Success value: the matched node, or a projection of it.
        value: &'t Value,
        /// Variable captures.
        bindings: Bindings<'t>,
    },
    /// The pattern does not match here.
    NotMatched,
}

impl<'t> MatchResult<'t> {
    /// Whether the pattern matched.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    /// Success value, if matched.
    pub fn value(&self) -> Option<&'t Value> {
        match self {
            MatchResult::Matched { value, .. } => Some(value),
            MatchResult::NotMatched => None,
        }
    }

    /// Value captured by `var`, if matched and bound.
    pub fn get(&self, var: &Variable) -> Option<&'t Value> {
        match self {
            MatchResult::Matched { bindings, .. } => bindings.get(var),
            MatchResult::NotMatched => None,
        }
    }

    /// String captured by `var`.
    pub fn get_str(&self, var: &Variable) -> Option<&'t str> {
        self.get(var).and_then(Value::as_str)
    }
}

/// A declarative tree shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Never matches.
    Fail,
    /// Always matches, with the node itself.
    Success,
    /// Object whose `type` equals the name.
    Type(String),
    /// Value equal to the given one.
    Equal(Value),
    /// Object whose named field exists and matches the sub-pattern.
    Field(String, Box<Pattern>),
    /// Array of exactly these elements, matched pairwise.
    Array(Vec<Pattern>),
    /// Every pattern matches the same node; the last one gives the value.
    And(Vec<Pattern>),
    /// First matching alternative, tried left to right.
    Or(Vec<Pattern>),
    /// The node or any descendant matches.
    Contains(Box<Pattern>),
    /// A `target` match not nested under any `avoid` match.
    NotWithin {
        /// Subtrees matching this are skipped entirely.
        avoid: Box<Pattern>,
        /// The pattern searched for.
        target: Box<Pattern>,
    },
    /// Array with an element matching the pattern; the value is the array.
    ArrayWithElement(Box<Pattern>),
    /// First pattern yields an array, some element of which matches the
    /// second pattern; the value is that element.
    ArrayElement(Box<Pattern>, Box<Pattern>),
    /// Named field of the first pattern's success value.
    GetField(Box<Pattern>, String),
    /// Capture.
    Variable(Variable),
}

type Accept<'k, 't> = dyn FnMut(&'t Value, &Bindings<'t>) -> bool + 'k;

impl Pattern {
    /// Match against `tree`, returning the first accepted solution.
    pub fn matches<'t>(&self, tree: &'t Value) -> MatchResult<'t> {
        let mut result = MatchResult::NotMatched;
        self.solve(tree, &Bindings::default(), &mut |value, bindings| {
            result = MatchResult::Matched {
                value,
                bindings: bindings.clone(),
            };
            true
        });
        result
    }

    /// Every solution of this pattern against `tree`, in search order.
    pub fn solutions<'t>(&self, tree: &'t Value) -> Vec<MatchResult<'t>> {
        let mut all = Vec::new();
        self.solve(tree, &Bindings::default(), &mut |value, bindings| {
            all.push(MatchResult::Matched {
                value,
                bindings: bindings.clone(),
            });
            false
        });
        all
    }

    /// Enumerate solutions, handing each to `accept`. Returns true as soon
    /// as `accept` does; false once the solutions are exhausted.
    fn solve<'t>(&self, node: &'t Value, env: &Bindings<'t>, accept: &mut Accept<'_, 't>) -> bool {
        ensure_sufficient_stack(|| self.solve_node(node, env, &mut *accept))
    }

    fn solve_node<'t>(&self, node: &'t Value, env: &Bindings<'t>, accept: &mut Accept<'_, 't>) -> bool {
        match self {
            Pattern::Fail => false,

            Pattern::Success => accept(node, env),

            Pattern::Type(name) => {
                node.get("type").and_then(Value::as_str) == Some(name.as_str()) && accept(node, env)
            }

            Pattern::Equal(expected) => node == expected && accept(node, env),

            Pattern::Field(name, sub) => match node.as_object().and_then(|o| o.get(name)) {
                Some(child) => sub.solve(child, env, &mut |_, bindings| accept(node, bindings)),
                None => false,
            },

            Pattern::Array(patterns) => match node.as_array() {
                Some(elements) if elements.len() == patterns.len() => {
                    solve_pairwise(patterns, elements, env, &mut |bindings| accept(node, bindings))
                }
                _ => false,
            },

            Pattern::And(patterns) => solve_all(patterns, node, node, env, accept),

            Pattern::Or(patterns) => patterns.iter().any(|p| p.solve(node, env, accept)),

            Pattern::Contains(sub) => abortable_walk(node, |candidate| {
                if sub.solve(candidate, env, accept) {
                    Step::Found(())
                } else {
                    Step::Descend
                }
            })
            .is_some(),

            Pattern::NotWithin { avoid, target } => abortable_walk(node, |candidate| {
                if avoid.matches(candidate).is_match() {
                    Step::Prune
                } else if target.solve(candidate, env, accept) {
                    Step::Found(())
                } else {
                    Step::Descend
                }
            })
            .is_some(),

            Pattern::ArrayWithElement(element) => match node.as_array() {
                Some(elements) => elements
                    .iter()
                    .any(|e| element.solve(e, env, &mut |_, bindings| accept(node, bindings))),
                None => false,
            },

            Pattern::ArrayElement(array, element) => array.solve(node, env, &mut |value, bindings| {
                value.as_array().map_or(false, |elements| {
                    elements
                        .iter()
                        .any(|e| element.solve(e, bindings, &mut |_, inner| accept(e, inner)))
                })
            }),

            Pattern::GetField(sub, name) => sub.solve(node, env, &mut |value, bindings| {
                match value.as_object().and_then(|o| o.get(name)) {
                    Some(field) => accept(field, bindings),
                    None => false,
                }
            }),

            Pattern::Variable(var) => {
                var.filter.map_or(true, |kind| kind.admits(node)) && accept(node, &env.with(var, node))
            }
        }
    }
}

fn solve_all<'t>(
    patterns: &[Pattern],
    node: &'t Value,
    value: &'t Value,
    env: &Bindings<'t>,
    accept: &mut Accept<'_, 't>,
) -> bool {
    match patterns.split_first() {
        None => accept(value, env),
        Some((first, rest)) => first.solve(node, env, &mut |v, bindings| {
            solve_all(rest, node, v, bindings, accept)
        }),
    }
}

fn solve_pairwise<'t>(
    patterns: &[Pattern],
    elements: &'t [Value],
    env: &Bindings<'t>,
    accept: &mut dyn FnMut(&Bindings<'t>) -> bool,
) -> bool {
    match (patterns.split_first(), elements.split_first()) {
        (Some((pattern, rest)), Some((element, remaining))) => {
            pattern.solve(element, env, &mut |_, bindings| {
                solve_pairwise(rest, remaining, bindings, accept)
            })
        }
        _ => accept(env),
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::Equal(Value::String(value.to_string()))
    }
}

impl From<bool> for Pattern {
    fn from(value: bool) -> Self {
        Pattern::Equal(Value::Bool(value))
    }
}

impl From<Value> for Pattern {
    /// Objects become an AND of field patterns and arrays an element-wise
    /// array pattern, recursively; every other value is matched by equality.
    fn from(shape: Value) -> Self {
        match shape {
            Value::Object(fields) => {
                object_pat(fields.into_iter().map(|(name, v)| (name, Pattern::from(v))))
            }
            Value::Array(elements) => array_pat(elements.into_iter().map(Pattern::from)),
            other => Pattern::Equal(other),
        }
    }
}

/// Match whatever `matches` returns for this pattern against `tree`.
pub fn matches<'t>(pattern: &Pattern, tree: &'t Value) -> MatchResult<'t> {
    pattern.matches(tree)
}

/// Never matches; the identity of [`or_pat`].
pub fn fail_pat() -> Pattern {
    Pattern::Fail
}

/// Always matches.
pub fn success_pat() -> Pattern {
    Pattern::Success
}

/// Node whose `type` discriminator equals `name`.
pub fn type_pat(name: &str) -> Pattern {
    Pattern::Type(name.to_string())
}

/// Value equal to `value`.
pub fn equal_pat(value: impl Into<Value>) -> Pattern {
    Pattern::Equal(value.into())
}

/// Object with a field `name` matching `sub`.
pub fn field_pat(name: &str, sub: impl Into<Pattern>) -> Pattern {
    Pattern::Field(name.to_string(), Box::new(sub.into()))
}

/// Conjunction of field patterns built from `(name, pattern)` pairs.
pub fn object_pat<I, K, P>(fields: I) -> Pattern
where
    I: IntoIterator<Item = (K, P)>,
    K: Into<String>,
    P: Into<Pattern>,
{
    Pattern::And(
        fields
            .into_iter()
            .map(|(name, sub)| Pattern::Field(name.into(), Box::new(sub.into())))
            .collect(),
    )
}

/// Array whose elements match `elements` pairwise, with equal length.
pub fn array_pat(elements: impl IntoIterator<Item = Pattern>) -> Pattern {
    Pattern::Array(elements.into_iter().collect())
}

/// All patterns match the same node. An empty list matches anything.
pub fn and_pat(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
    Pattern::And(patterns.into_iter().collect())
}

/// First of `patterns` that matches. An empty list never matches.
pub fn or_pat(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
    Pattern::Or(patterns.into_iter().collect())
}

/// The node or any of its descendants matches `sub`.
pub fn contains_pat(sub: Pattern) -> Pattern {
    Pattern::Contains(Box::new(sub))
}

/// A `target` match that is not nested within any `avoid` match.
pub fn not_within_pat(avoid: Pattern, target: Pattern) -> Pattern {
    Pattern::NotWithin {
        avoid: Box::new(avoid),
        target: Box::new(target),
    }
}

/// Array containing an element matching `element`.
pub fn array_with_element_pat(element: Pattern) -> Pattern {
    Pattern::ArrayWithElement(Box::new(element))
}

/// Element matching `element` of the array produced by `array`.
pub fn array_element_pat(array: Pattern, element: Pattern) -> Pattern {
    Pattern::ArrayElement(Box::new(array), Box::new(element))
}

/// Field `name` of the value produced by `sub`.
pub fn get_field_pat(sub: Pattern, name: &str) -> Pattern {
    Pattern::GetField(Box::new(sub), name.to_string())
}

/// A fresh capture, optionally restricted to one primitive kind.
pub fn variable_pat(filter: Option<ValueKind>) -> (Variable, Pattern) {
    let var = match filter {
        Some(kind) => Variable::typed(kind),
        None => Variable::new(),
    };
    (var, var.pattern())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call_tree() -> Value {
        json!({
            "type": "Program",
            "body": [
                { "type": "CallExpression",
                  "callee": { "type": "Identifier", "name": "define" },
                  "arguments": [
                      { "type": "ArrayExpression", "elements": [
                          { "type": "Literal", "value": "a" },
                          { "type": "Literal", "value": 1 },
                          { "type": "Literal", "value": "b" }
                      ]}
                  ]
                }
            ]
        })
    }

    #[test]
    fn test_type_and_equal() {
        let node = json!({ "type": "Identifier", "name": "x" });
        assert!(type_pat("Identifier").matches(&node).is_match());
        assert!(!type_pat("Literal").matches(&node).is_match());
        assert!(equal_pat("x").matches(&json!("x")).is_match());
        assert!(!equal_pat("x").matches(&json!("y")).is_match());
    }

    #[test]
    fn test_empty_folds() {
        let node = json!({ "type": "Identifier" });
        assert!(!or_pat([]).matches(&node).is_match());
        assert!(and_pat([]).matches(&node).is_match());
        assert!(!fail_pat().matches(&node).is_match());
    }

    #[test]
    fn test_or_is_left_biased() {
        let a = Variable::new();
        let b = Variable::new();
        let node = json!("v");
        let result = or_pat([a.pattern(), b.pattern()]).matches(&node);
        assert!(result.get(&a).is_some());
        assert!(result.get(&b).is_none());
    }

    #[test]
    fn test_object_pat_from_shape() {
        let pattern = Pattern::from(json!({ "type": "Identifier", "name": "define" }));
        assert!(pattern.matches(&call_tree()["body"][0]["callee"]).is_match());
        assert!(!pattern.matches(&call_tree()["body"][0]).is_match());
    }

    #[test]
    fn test_field_pat_requires_field() {
        let pattern = field_pat("missing", success_pat());
        assert!(!pattern.matches(&call_tree()).is_match());
    }

    #[test]
    fn test_contains_binds_first_hit() {
        let name = Variable::typed(ValueKind::String);
        let pattern = contains_pat(object_pat([
            ("type", Pattern::from("Identifier")),
            ("name", name.pattern()),
        ]));
        let tree = call_tree();
        let result = pattern.matches(&tree);
        assert_eq!(result.get_str(&name), Some("define"));
    }

    #[test]
    fn test_variable_type_filter() {
        let (var, pattern) = variable_pat(Some(ValueKind::String));
        assert!(!pattern.matches(&json!(1)).is_match());
        let tree = json!("s");
        let result = pattern.matches(&tree);
        assert_eq!(result.get_str(&var), Some("s"));
    }

    #[test]
    fn test_backtracking_through_contains() {
        // The first Literal has a numeric value; rejecting it by kind must
        // resume the containment search at the next literal.
        let value = Variable::typed(ValueKind::String);
        let pattern = contains_pat(object_pat([
            ("type", Pattern::from("Literal")),
            ("value", value.pattern()),
        ]));
        let tree = json!([{ "type": "Literal", "value": 1 }, { "type": "Literal", "value": "z" }]);
        assert_eq!(pattern.matches(&tree).get_str(&value), Some("z"));
    }

    #[test]
    fn test_get_field_backtracks() {
        let pattern = get_field_pat(contains_pat(type_pat("Literal")), "extra");
        let tree = json!([
            { "type": "Literal", "value": 1 },
            { "type": "Literal", "value": 2, "extra": "yes" }
        ]);
        assert_eq!(pattern.matches(&tree).value(), Some(&json!("yes")));
    }

    #[test]
    fn test_array_element_pat_yields_element() {
        let value = Variable::typed(ValueKind::String);
        let pattern = array_element_pat(
            get_field_pat(success_pat(), "elements"),
            field_pat("value", value.pattern()),
        );
        let array = &call_tree()["body"][0]["arguments"][0];
        let solutions: Vec<_> = pattern
            .solutions(array)
            .iter()
            .filter_map(|m| m.get_str(&value).map(str::to_string))
            .collect();
        assert_eq!(solutions, vec!["a", "b"]);
    }

    #[test]
    fn test_array_with_element_pat() {
        let pattern = field_pat("elements", array_with_element_pat(field_pat("value", equal_pat(1))));
        let array = &call_tree()["body"][0]["arguments"][0];
        assert_eq!(pattern.matches(array).value(), Some(array));
    }

    #[test]
    fn test_not_within_skips_avoided_subtrees() {
        let name = Variable::typed(ValueKind::String);
        let ident = object_pat([("type", Pattern::from("Identifier")), ("name", name.pattern())]);
        let tree = json!({
            "type": "Program",
            "body": [
                { "type": "Wrapper", "inner": { "type": "Identifier", "name": "hidden" } },
                { "type": "Identifier", "name": "visible" }
            ]
        });
        let pattern = not_within_pat(type_pat("Wrapper"), ident.clone());
        assert_eq!(pattern.matches(&tree).get_str(&name), Some("visible"));
        assert_eq!(contains_pat(ident).matches(&tree).get_str(&name), Some("hidden"));
    }

    #[test]
    fn test_reused_pattern_does_not_alias() {
        let name = Variable::typed(ValueKind::String);
        let pattern = field_pat("name", name.pattern());
        let first_tree = json!({ "name": "one" });
        let second_tree = json!({ "name": "two" });
        let first = pattern.matches(&first_tree);
        let second = pattern.matches(&second_tree);
        assert_eq!(first.get_str(&name), Some("one"));
        assert_eq!(second.get_str(&name), Some("two"));
    }

    #[test]
    fn test_array_pat_requires_exact_length() {
        let value = Variable::typed(ValueKind::String);
        let pattern = array_pat([field_pat("value", value.pattern())]);
        let one = json!([{ "value": "x" }]);
        let two = json!([{ "value": "x" }, { "value": "y" }]);
        assert_eq!(pattern.matches(&one).get_str(&value), Some("x"));
        assert!(!pattern.matches(&two).is_match());
        assert!(Pattern::from(json!([])).matches(&json!([])).is_match());
    }

    #[test]
    fn test_and_value_is_last_conjunct() {
        let node = json!({ "type": "X", "child": { "type": "Y" } });
        let pattern = and_pat([type_pat("X"), get_field_pat(success_pat(), "child")]);
        assert_eq!(pattern.matches(&node).value(), Some(&json!({ "type": "Y" })));
    }

    #[test]
    fn test_contains_reaches_deep_descendants() {
        let name = Variable::typed(ValueKind::String);
        let mut tree = json!({ "type": "Leaf", "name": "bottom" });
        for _ in 0..1_000 {
            tree = json!({ "type": "Wrap", "children": [tree] });
        }
        let pattern = contains_pat(and_pat([type_pat("Leaf"), field_pat("name", name.pattern())]));
        assert_eq!(pattern.matches(&tree).get_str(&name), Some("bottom"));
    }
}
