//! Reference extraction from parse trees.
//!
//! One finder per module dialect:
//! - AMD: dependency arrays of `define`/`require`/`requirejs` and
//!   `require('x')` inside wrappers
//! - CommonJS: `require('x')`
//! - Namespaced: `<namespace>.require('x')`
//!
//! Finders return raw names as written, in first-seen order, without
//! duplicates. Resolution happens later, in [`crate::resolve`].

pub mod amd;
pub mod commonjs;
pub mod namespaced;

use crate::ingest::detect::Dialect;
use crate::syntax::ParseTree;
use serde::{Deserialize, Serialize};

/// A raw or resolved import mention extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Dialect that produced this reference.
    pub kind: Dialect,

    /// Name exactly as written in source.
    pub name: String,

    /// Resolved file identity; absent when resolution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Recognized but deliberately unresolvable (unknown loader plugin).
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore: bool,

    /// Every plausible target considered by sloppy resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Reference {
    /// An unresolved reference.
    pub fn new(kind: Dialect, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: None,
            ignore: false,
            candidates: None,
        }
    }

    /// A reference already resolved to `path`.
    pub fn resolved(kind: Dialect, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(kind, name)
        }
    }

    /// Whether resolution produced a path.
    pub fn is_resolved(&self) -> bool {
        self.path.is_some()
    }
}

/// A plausible resolution target found by sloppy search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Project-relative file path.
    pub path: String,
    /// Number of agreeing trailing segments beyond the file name.
    pub score: usize,
}

/// Extracts raw reference names of one dialect.
pub trait ReferenceFinder: Send + Sync {
    /// Ordered, de-duplicated names as written in source.
    fn find(&self, tree: &ParseTree) -> Vec<String>;
}

/// Append `name` unless it is already present.
fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}

pub use amd::AmdFinder;
pub use commonjs::CommonJsFinder;
pub use namespaced::NamespacedFinder;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_json_shape() {
        let unresolved = Reference::new(Dialect::AMD, "missing");
        assert_eq!(
            serde_json::to_value(&unresolved).unwrap(),
            json!({ "kind": "AMD", "name": "missing" })
        );

        let mut ignored = Reference::new(Dialect::AMD, "domReady!");
        ignored.ignore = true;
        assert_eq!(
            serde_json::to_value(&ignored).unwrap(),
            json!({ "kind": "AMD", "name": "domReady!", "ignore": true })
        );

        let resolved = Reference::resolved(Dialect::COMMONJS, "./a", "lib/a.js");
        assert_eq!(
            serde_json::to_value(&resolved).unwrap(),
            json!({ "kind": "commonjs", "name": "./a", "path": "lib/a.js" })
        );
    }

    #[test]
    fn test_reference_round_trips_through_json() {
        let mut reference = Reference::resolved(Dialect::AMD, "util", "src/util.js");
        reference.candidates = Some(vec![Candidate {
            path: "src/util.js".to_string(),
            score: 0,
        }]);
        let text = serde_json::to_string(&reference).unwrap();
        let back: Reference = serde_json::from_str(&text).unwrap();
        assert_eq!(back, reference);
    }

    #[test]
    fn test_push_unique_keeps_first_occurrence() {
        let mut names = Vec::new();
        for name in ["b", "a", "b", "c", "a"] {
            push_unique(&mut names, name);
        }
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
