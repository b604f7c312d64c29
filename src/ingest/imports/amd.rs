//! AMD dependency extraction.
//!
//! Collects string literals from the dependency arrays of `define`,
//! `require` and `requirejs` calls, and from `require('x')` /
//! `requirejs('x')` calls with a single string argument (the form used
//! inside `define(function (require) {...})` wrappers).

use super::{push_unique, ReferenceFinder};
use crate::pattern::estree::{array_expression, call, call_with, identifier_in, string_literal};
use crate::pattern::{
    array_element_pat, array_pat, get_field_pat, or_pat, Pattern, ValueKind, Variable,
};
use crate::syntax::walk::walk;
use crate::syntax::ParseTree;

/// Finder for `"AMD"` and `"commonjs,AMD"` files.
#[derive(Debug, Clone)]
pub struct AmdFinder {
    name: Variable,
    pattern: Pattern,
}

impl Default for AmdFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl AmdFinder {
    /// Create the finder.
    pub fn new() -> Self {
        let name = Variable::typed(ValueKind::String);

        // Every string element of every array argument. The module id of
        // `define('id', [...])` is a plain string argument and is skipped.
        let dependency_array = array_element_pat(
            get_field_pat(
                array_element_pat(
                    get_field_pat(call(identifier_in(&["define", "require", "requirejs"])), "arguments"),
                    array_expression(),
                ),
                "elements",
            ),
            string_literal(&name),
        );

        let single_string = call_with(
            identifier_in(&["require", "requirejs"]),
            array_pat([string_literal(&name)]),
        );

        Self {
            name,
            pattern: or_pat([dependency_array, single_string]),
        }
    }
}

impl ReferenceFinder for AmdFinder {
    fn find(&self, tree: &ParseTree) -> Vec<String> {
        let mut names = Vec::new();
        walk(tree, &mut |node| {
            for solution in self.pattern.solutions(node) {
                if let Some(name) = solution.get_str(&self.name) {
                    push_unique(&mut names, name);
                }
            }
            true
        });
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_javascript;

    fn find(source: &str) -> Vec<String> {
        AmdFinder::new().find(&parse_javascript(source))
    }

    #[test]
    fn test_define_dependency_array() {
        assert_eq!(
            find("define(['a', './b', 'text!t.html'], function (a, b, t) {});"),
            vec!["a", "./b", "text!t.html"]
        );
    }

    #[test]
    fn test_named_define_skips_module_id() {
        assert_eq!(find("define('mine', ['dep'], function (dep) {});"), vec!["dep"]);
    }

    #[test]
    fn test_require_array_and_nested_calls() {
        let source = "require(['main', 'util'], function (main) {\n  require(['late']);\n});";
        assert_eq!(find(source), vec!["main", "util", "late"]);
    }

    #[test]
    fn test_wrapper_requires() {
        let source = "define(function (require) {\n  var a = require('./a');\n  var b = require('b');\n});";
        assert_eq!(find(source), vec!["./a", "b"]);
    }

    #[test]
    fn test_duplicates_dropped_in_first_seen_order() {
        let source = "define(['x', 'y', 'x'], function () { require('y'); require('z'); });";
        assert_eq!(find(source), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_non_string_elements_ignored() {
        assert_eq!(find("define(['a', 42, dyn], function () {});"), vec!["a"]);
    }

    #[test]
    fn test_no_references() {
        assert!(find("var x = 1;").is_empty());
    }
}
