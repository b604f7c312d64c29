//! Dialect-aware reference extraction dispatcher.
//!
//! Classifies a parse tree and routes it to the finder registered for the
//! resulting dialect. The registry is a plain value, so callers can add
//! dialects (a classifier rule plus a finder) without touching this module.

use crate::ingest::detect::{Dialect, ModuleClassifier};
use crate::ingest::imports::{AmdFinder, CommonJsFinder, NamespacedFinder, Reference, ReferenceFinder};
use crate::syntax::{parse_javascript, ParseTree};
use std::collections::HashMap;
use std::sync::Arc;

/// Classifier plus the dialect → finder table.
#[derive(Clone)]
pub struct DialectRegistry {
    classifier: ModuleClassifier,
    finders: HashMap<Dialect, Arc<dyn ReferenceFinder>>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new("goog")
    }
}

impl DialectRegistry {
    /// Built-in dialects, with `namespace` for namespaced requires.
    pub fn new(namespace: &str) -> Self {
        let amd: Arc<dyn ReferenceFinder> = Arc::new(AmdFinder::new());
        let mut registry = Self::with_classifier(ModuleClassifier::new(namespace));
        registry.finders.insert(Dialect::AMD, Arc::clone(&amd));
        registry.finders.insert(Dialect::COMMONJS_AMD, amd);
        registry.register(Dialect::COMMONJS, CommonJsFinder::new());
        registry.register(Dialect::NAMESPACED, NamespacedFinder::new(namespace));
        registry
    }

    /// A registry with the given classifier and no finders.
    pub fn with_classifier(classifier: ModuleClassifier) -> Self {
        Self {
            classifier,
            finders: HashMap::new(),
        }
    }

    /// Register (or replace) the finder for `dialect`.
    pub fn register(&mut self, dialect: Dialect, finder: impl ReferenceFinder + 'static) {
        self.finders.insert(dialect, Arc::new(finder));
    }

    /// The classifier, for adding rules.
    pub fn classifier_mut(&mut self) -> &mut ModuleClassifier {
        &mut self.classifier
    }

    /// Label a parse tree.
    pub fn classify(&self, tree: &ParseTree) -> Dialect {
        self.classifier.classify(tree)
    }

    /// Classify `tree` and extract its references with the matching finder.
    ///
    /// A dialect without a finder yields no references.
    pub fn find_references(&self, tree: &ParseTree) -> (Vec<Reference>, Dialect) {
        let dialect = self.classify(tree);
        let references = self.find_with(&dialect, tree);
        log::debug!("Dialect {} with {} references", dialect, references.len());
        (references, dialect)
    }

    /// Extract references with the finder of a known dialect.
    pub fn find_with(&self, dialect: &Dialect, tree: &ParseTree) -> Vec<Reference> {
        match self.finders.get(dialect) {
            Some(finder) => finder
                .find(tree)
                .into_iter()
                .map(|name| Reference::new(dialect.clone(), name))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Parse `source` and extract its raw references.
///
/// # Example
///
/// ```
/// use jsdepend::ingest::dispatch::{extract_references, DialectRegistry};
/// use jsdepend::ingest::detect::Dialect;
///
/// let registry = DialectRegistry::default();
/// let (refs, dialect) = extract_references(&registry, "var a = require('./a');");
/// assert_eq!(dialect, Dialect::COMMONJS);
/// assert_eq!(refs[0].name, "./a");
/// ```
pub fn extract_references(registry: &DialectRegistry, source: &str) -> (Vec<Reference>, Dialect) {
    registry.find_references(&parse_javascript(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{contains_pat, type_pat};
    use serde_json::json;

    #[test]
    fn test_dispatch_amd() {
        let registry = DialectRegistry::default();
        let (refs, dialect) = extract_references(&registry, "define(['a', 'b'], function () {});");
        assert_eq!(dialect, Dialect::AMD);
        assert_eq!(
            serde_json::to_value(&refs).unwrap(),
            json!([{ "kind": "AMD", "name": "a" }, { "kind": "AMD", "name": "b" }])
        );
    }

    #[test]
    fn test_dispatch_wrapper_uses_dual_tag() {
        let registry = DialectRegistry::default();
        let (refs, dialect) =
            extract_references(&registry, "define(function (require) { require('./x'); });");
        assert_eq!(dialect, Dialect::COMMONJS_AMD);
        assert_eq!(refs, vec![Reference::new(Dialect::COMMONJS_AMD, "./x")]);
    }

    #[test]
    fn test_dispatch_namespaced() {
        let registry = DialectRegistry::default();
        let (refs, dialect) = extract_references(&registry, "goog.require('a.b');");
        assert_eq!(dialect, Dialect::NAMESPACED);
        assert_eq!(refs, vec![Reference::new(Dialect::NAMESPACED, "a.b")]);
    }

    #[test]
    fn test_unknown_dialect_yields_nothing() {
        let registry = DialectRegistry::default();
        let (refs, dialect) = extract_references(&registry, "alert('hi');");
        assert_eq!(dialect, Dialect::UNKNOWN);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_registered_dialect() {
        struct ImportFinder;
        impl ReferenceFinder for ImportFinder {
            fn find(&self, _tree: &ParseTree) -> Vec<String> {
                vec!["es-module".to_string()]
            }
        }

        let mut registry = DialectRegistry::default();
        let es6 = Dialect::new("es6");
        registry
            .classifier_mut()
            .push_rule(es6.clone(), contains_pat(type_pat("ImportStatement")));
        registry.register(es6.clone(), ImportFinder);

        let (refs, dialect) = extract_references(&registry, "import x from 'y';");
        assert_eq!(dialect, es6);
        assert_eq!(refs, vec![Reference::new(es6, "es-module")]);
    }
}
