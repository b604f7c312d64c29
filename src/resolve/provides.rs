//! Index of `<namespace>.provide('x')` declarations.
//!
//! Namespaced references name what a file provides, not where it lives, so
//! resolution goes through an index built from every script in the project.

use crate::ingest::is_script;
use crate::pattern::estree::{identifier, member, string_literal};
use crate::pattern::{array_pat, contains_pat, object_pat, or_pat, Pattern, ValueKind, Variable};
use crate::store::{walk_files, FileStore};
use crate::syntax::parse_javascript;
use std::collections::HashMap;

/// Maps provided names to the file declaring them.
#[derive(Debug, Clone, Default)]
pub struct ProvideIndex {
    providers: HashMap<String, String>,
}

impl ProvideIndex {
    /// Scan every script below the root. The first file providing a name
    /// (in walk order) owns it.
    pub fn build(store: &dyn FileStore, namespace: &str, exclude: &[String]) -> Self {
        let name = Variable::typed(ValueKind::String);
        let pattern = contains_pat(provide_call(namespace, &name));
        let mut providers = HashMap::new();

        for file in walk_files(store, "", exclude).iter().filter(|f| is_script(f)) {
            let source = match store.get_contents(file) {
                Ok(source) => source,
                Err(e) => {
                    log::warn!("Skipping unreadable script {}: {}", file, e);
                    continue;
                }
            };
            // Cheap pre-filter before parsing.
            if !source.contains(".provide(") && !source.contains(".module(") {
                continue;
            }
            let tree = parse_javascript(&source);
            for result in pattern.solutions(&tree) {
                if let Some(provided) = result.get_str(&name) {
                    providers
                        .entry(provided.to_string())
                        .or_insert_with(|| file.clone());
                }
            }
        }

        log::debug!("Indexed {} provided namespace(s)", providers.len());
        Self { providers }
    }

    /// File providing `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.providers.get(name).map(String::as_str)
    }

    /// Number of indexed names.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether nothing is provided anywhere.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// `<namespace>.provide('x')` or `<namespace>.module('x')`.
fn provide_call(namespace: &str, name: &Variable) -> Pattern {
    object_pat([
        ("type", Pattern::from("CallExpression")),
        (
            "callee",
            or_pat([
                member(identifier(namespace), "provide"),
                member(identifier(namespace), "module"),
            ]),
        ),
        ("arguments", array_pat([string_literal(name)])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFileStore;

    #[test]
    fn test_index_first_provider_wins() {
        let store = MemoryFileStore::new()
            .with_file("a/dom.js", "goog.provide('app.dom'); goog.provide('app.dom.Range');")
            .with_file("b/dom.js", "goog.provide('app.dom');")
            .with_file("c/mod.js", "goog.module('app.mod');")
            .with_file("d/other.js", "other.provide('app.x');");
        let index = ProvideIndex::build(&store, "goog", &[]);
        assert_eq!(index.lookup("app.dom"), Some("a/dom.js"));
        assert_eq!(index.lookup("app.dom.Range"), Some("a/dom.js"));
        assert_eq!(index.lookup("app.mod"), Some("c/mod.js"));
        assert_eq!(index.lookup("app.x"), None);
        assert_eq!(index.len(), 3);
    }
}
