//! Module dialect detection from parse trees.
//!
//! Rule-driven: the first rule whose pattern matches the tree decides the
//! dialect. Built-in rules are checked in a fixed priority order (AMD,
//! then the CommonJS wrapper, then plain CommonJS, then namespaced
//! imports); extra rules can be appended.

use crate::pattern::estree::{
    array_expression, call, call_with, function_with_params, identifier, identifier_in, member,
    some_argument, string_literal,
};
use crate::pattern::{
    and_pat, array_pat, array_with_element_pat, contains_pat, not_within_pat, object_pat, or_pat,
    type_pat, Pattern, ValueKind, Variable,
};
use crate::syntax::ParseTree;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Tag naming the module convention a file uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dialect(Cow<'static, str>);

impl Dialect {
    /// Array-of-dependencies `define`/`require` calls.
    pub const AMD: Dialect = Dialect(Cow::Borrowed("AMD"));
    /// `define(function (require) {...})` wrappers around synchronous requires.
    pub const COMMONJS_AMD: Dialect = Dialect(Cow::Borrowed("commonjs,AMD"));
    /// Synchronous `require('x')` calls and `exports` assignments.
    pub const COMMONJS: Dialect = Dialect(Cow::Borrowed("commonjs"));
    /// `<namespace>.require('x')` calls.
    pub const NAMESPACED: Dialect = Dialect(Cow::Borrowed("namespaced"));
    /// Plain scripts ordered by the page that loads them.
    pub const GLOBAL: Dialect = Dialect(Cow::Borrowed("global"));
    /// None of the known conventions.
    pub const UNKNOWN: Dialect = Dialect(Cow::Borrowed("unknown"));

    /// A custom dialect tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Dialect(Cow::Owned(tag.into()))
    }

    /// Tag as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether references of this dialect resolve through AMD loader rules.
    pub fn is_amd(&self) -> bool {
        *self == Dialect::AMD || *self == Dialect::COMMONJS_AMD
    }

    /// Whether references of this dialect resolve through CommonJS rules.
    pub fn is_commonjs(&self) -> bool {
        *self == Dialect::COMMONJS
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered classification rules.
#[derive(Debug, Clone)]
pub struct ModuleClassifier {
    rules: Vec<(Dialect, Pattern)>,
}

impl Default for ModuleClassifier {
    fn default() -> Self {
        Self::new("goog")
    }
}

impl ModuleClassifier {
    /// Built-in rules, with `namespace` as the object of namespaced
    /// `require` calls.
    pub fn new(namespace: &str) -> Self {
        Self {
            rules: vec![
                (Dialect::AMD, contains_pat(amd_pattern())),
                (Dialect::COMMONJS_AMD, contains_pat(commonjs_wrapper_pattern())),
                (Dialect::COMMONJS, commonjs_pattern()),
                (
                    Dialect::NAMESPACED,
                    contains_pat(namespaced_require(
                        namespace,
                        &Variable::typed(ValueKind::String),
                    )),
                ),
            ],
        }
    }

    /// A classifier without rules; everything is unknown.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule checked after the existing ones.
    pub fn push_rule(&mut self, dialect: Dialect, pattern: Pattern) {
        self.rules.push((dialect, pattern));
    }

    /// Label a parse tree.
    pub fn classify(&self, tree: &ParseTree) -> Dialect {
        self.rules
            .iter()
            .find(|(_, pattern)| pattern.matches(tree).is_match())
            .map(|(dialect, _)| dialect.clone())
            .unwrap_or(Dialect::UNKNOWN)
    }
}

/// Any `define(...)` call.
pub fn define_call() -> Pattern {
    call(identifier("define"))
}

/// `require('x')` with exactly one string literal argument.
pub fn require_call(name: &Variable) -> Pattern {
    call_with(identifier("require"), array_pat([string_literal(name)]))
}

/// `<namespace>.require('x')`.
pub fn namespaced_require(namespace: &str, name: &Variable) -> Pattern {
    call_with(
        member(identifier(namespace), "require"),
        array_pat([string_literal(name)]),
    )
}

/// Array-of-dependencies call, or a `define` that does not wrap
/// synchronous requires (object literal or parameterless factory).
fn amd_pattern() -> Pattern {
    or_pat([
        call_with(
            identifier_in(&["define", "require", "requirejs"]),
            some_argument(array_expression()),
        ),
        call_with(
            identifier("define"),
            some_argument(or_pat([
                type_pat("ObjectExpression"),
                function_with_params(array_pat([])),
            ])),
        ),
    ])
}

/// `define(function (require, exports, module) {...})`.
fn commonjs_wrapper_pattern() -> Pattern {
    call_with(
        identifier("define"),
        some_argument(function_with_params(array_with_element_pat(identifier(
            "require",
        )))),
    )
}

/// `exports` assignment anywhere, or a `require('x')` outside any `define`.
fn commonjs_pattern() -> Pattern {
    let exports_object = or_pat([identifier("exports"), member(identifier("module"), "exports")]);
    let assignment_target = or_pat([
        object_pat([
            ("type", Pattern::from("MemberExpression")),
            ("object", exports_object),
        ]),
        member(identifier("module"), "exports"),
    ]);
    let exports_assignment = and_pat([
        type_pat("AssignmentExpression"),
        object_pat([("left", assignment_target)]),
    ]);

    let name = Variable::typed(ValueKind::String);
    or_pat([
        contains_pat(exports_assignment),
        not_within_pat(define_call(), require_call(&name)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_javascript;

    fn classify(source: &str) -> Dialect {
        ModuleClassifier::default().classify(&parse_javascript(source))
    }

    #[test]
    fn test_amd_define_with_array() {
        assert_eq!(classify("define(['a', 'b'], function (a, b) {});"), Dialect::AMD);
    }

    #[test]
    fn test_amd_named_define() {
        assert_eq!(classify("define('mod', ['a'], function (a) {});"), Dialect::AMD);
    }

    #[test]
    fn test_amd_require_with_array() {
        assert_eq!(classify("require(['main'], function (main) { main.go(); });"), Dialect::AMD);
    }

    #[test]
    fn test_amd_object_and_parameterless_define() {
        assert_eq!(classify("define({ color: 'red' });"), Dialect::AMD);
        assert_eq!(classify("define(function () { return 1; });"), Dialect::AMD);
    }

    #[test]
    fn test_commonjs_wrapper() {
        let source = "define(function (require, exports, module) {\n  var a = require('./a');\n});";
        assert_eq!(classify(source), Dialect::COMMONJS_AMD);
    }

    #[test]
    fn test_amd_takes_priority_over_wrapper() {
        let source = "define(['x'], function (x) {});\ndefine(function (require) { require('y'); });";
        assert_eq!(classify(source), Dialect::AMD);
    }

    #[test]
    fn test_commonjs_require() {
        assert_eq!(classify("var fs = require('fs');"), Dialect::COMMONJS);
    }

    #[test]
    fn test_commonjs_exports_assignment() {
        assert_eq!(classify("exports.foo = function () {};"), Dialect::COMMONJS);
        assert_eq!(classify("module.exports = { a: 1 };"), Dialect::COMMONJS);
        assert_eq!(classify("module.exports.b = 2;"), Dialect::COMMONJS);
    }

    #[test]
    fn test_namespaced() {
        assert_eq!(classify("goog.require('goog.dom');"), Dialect::NAMESPACED);
    }

    #[test]
    fn test_custom_namespace() {
        let classifier = ModuleClassifier::new("enyo");
        let tree = parse_javascript("enyo.require('widgets');");
        assert_eq!(classifier.classify(&tree), Dialect::NAMESPACED);
        let tree = parse_javascript("goog.require('goog.dom');");
        assert_eq!(classifier.classify(&tree), Dialect::UNKNOWN);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("var x = 1;\nfunction f() { return x; }"), Dialect::UNKNOWN);
        assert_eq!(classify("require(dynamicName);"), Dialect::UNKNOWN);
        assert_eq!(classify(""), Dialect::UNKNOWN);
    }

    #[test]
    fn test_custom_rule() {
        let mut classifier = ModuleClassifier::empty();
        classifier.push_rule(Dialect::new("es6"), contains_pat(type_pat("ImportStatement")));
        let tree = parse_javascript("import x from 'y';");
        assert_eq!(classifier.classify(&tree), Dialect::new("es6"));
    }

    #[test]
    fn test_dialect_serializes_as_tag() {
        assert_eq!(
            serde_json::to_string(&Dialect::COMMONJS_AMD).unwrap(),
            "\"commonjs,AMD\""
        );
        let parsed: Dialect = serde_json::from_str("\"AMD\"").unwrap();
        assert_eq!(parsed, Dialect::AMD);
    }
}
