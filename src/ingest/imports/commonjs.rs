//! CommonJS `require('x')` extraction.

use super::{push_unique, ReferenceFinder};
use crate::ingest::detect::require_call;
use crate::pattern::{Pattern, ValueKind, Variable};
use crate::syntax::walk::walk;
use crate::syntax::ParseTree;

/// Finder for `"commonjs"` files.
#[derive(Debug, Clone)]
pub struct CommonJsFinder {
    name: Variable,
    pattern: Pattern,
}

impl Default for CommonJsFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommonJsFinder {
    /// Create the finder.
    pub fn new() -> Self {
        let name = Variable::typed(ValueKind::String);
        Self {
            pattern: require_call(&name),
            name,
        }
    }
}

impl ReferenceFinder for CommonJsFinder {
    fn find(&self, tree: &ParseTree) -> Vec<String> {
        let mut names = Vec::new();
        walk(tree, &mut |node| {
            if let Some(name) = self.pattern.matches(node).get_str(&self.name) {
                push_unique(&mut names, name);
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
        CommonJsFinder::new().find(&parse_javascript(source))
    }

    #[test]
    fn test_require_calls() {
        let source = "var fs = require('fs');\nvar a = require('./lib/a');\nrequire('fs');";
        assert_eq!(find(source), vec!["fs", "./lib/a"]);
    }

    #[test]
    fn test_nested_require() {
        let source = "function load() { return require('lazy'); }";
        assert_eq!(find(source), vec!["lazy"]);
    }

    #[test]
    fn test_only_single_string_argument() {
        assert!(find("require('a', 'b'); require(name); require(['x']);").is_empty());
    }

    #[test]
    fn test_member_require_is_not_commonjs() {
        assert!(find("goog.require('x');").is_empty());
    }
}
