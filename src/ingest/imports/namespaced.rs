//! Namespaced `<namespace>.require('x')` extraction.

use super::{push_unique, ReferenceFinder};
use crate::ingest::detect::namespaced_require;
use crate::pattern::{Pattern, ValueKind, Variable};
use crate::syntax::walk::walk;
use crate::syntax::ParseTree;

/// Finder for `"namespaced"` files.
#[derive(Debug, Clone)]
pub struct NamespacedFinder {
    name: Variable,
    pattern: Pattern,
}

impl NamespacedFinder {
    /// Finder for `require` calls on `namespace`, e.g. `goog`.
    pub fn new(namespace: &str) -> Self {
        let name = Variable::typed(ValueKind::String);
        Self {
            pattern: namespaced_require(namespace, &name),
            name,
        }
    }
}

impl ReferenceFinder for NamespacedFinder {
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

    #[test]
    fn test_goog_requires() {
        let tree = parse_javascript(
            "goog.provide('app.main');\ngoog.require('goog.dom');\ngoog.require('app.util');\ngoog.require('goog.dom');",
        );
        assert_eq!(NamespacedFinder::new("goog").find(&tree), vec!["goog.dom", "app.util"]);
    }

    #[test]
    fn test_other_namespace_ignored() {
        let tree = parse_javascript("other.require('x');");
        assert!(NamespacedFinder::new("goog").find(&tree).is_empty());
    }
}
