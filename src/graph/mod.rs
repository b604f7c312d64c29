//! Dependency graph construction.
//!
//! A graph maps file identities to nodes. Each node records the dialect of
//! its file and the resolved references it makes. Building starts at one
//! root file and follows every resolved reference depth first; cycles are
//! cut by per-file visitation state.

pub mod global;

use crate::ingest::detect::Dialect;
use crate::ingest::dispatch::DialectRegistry;
use crate::ingest::imports::Reference;
use crate::ingest::is_script;
use crate::resolve::module_resolver::is_synthetic;
use crate::resolve::Resolver;
use crate::store::paths;
use crate::syntax::parse_javascript;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// File identity → node. Keys serialize in sorted order.
pub type Graph = BTreeMap<String, GraphNode>;

/// One file in a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Dialect of the file.
    pub kind: Dialect,

    /// References made by the file, keyed by raw name.
    pub refs: BTreeMap<String, Reference>,
}

impl GraphNode {
    /// A node without references.
    pub fn new(kind: Dialect) -> Self {
        Self {
            kind,
            refs: BTreeMap::new(),
        }
    }

    /// Node with the given references, keyed by their names.
    pub fn with_refs(kind: Dialect, refs: impl IntoIterator<Item = Reference>) -> Self {
        Self {
            kind,
            refs: refs.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }
}

/// Visitation state of a file during one build. Absent means unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// A file whose references are being followed.
struct Frame {
    file: String,
    node: GraphNode,
    /// Resolved targets still to visit, last first.
    pending: Vec<String>,
}

/// Builds one graph. Create a fresh builder per build.
pub struct GraphBuilder<'a> {
    resolver: &'a Resolver,
    registry: &'a DialectRegistry,
    states: HashMap<String, VisitState>,
    graph: Graph,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder.
    pub fn new(resolver: &'a Resolver, registry: &'a DialectRegistry) -> Self {
        Self {
            resolver,
            registry,
            states: HashMap::new(),
            graph: Graph::new(),
        }
    }

    /// Build the graph reachable from `root`.
    ///
    /// When the root turns out to be an `unknown` file, the nearest page
    /// loading it as a plain script supplies `global` dependencies instead.
    pub fn build(mut self, root: &str) -> Graph {
        let Some(root) = paths::normalize(root) else {
            log::warn!("Graph root '{}' is outside the project", root);
            return self.graph;
        };

        self.visit(&root);

        let root_is_unknown = self
            .graph
            .get(&root)
            .map_or(false, |node| node.kind == Dialect::UNKNOWN);
        if root_is_unknown {
            global::apply_page_scripts(self.resolver.store(), &root, &mut self.graph);
        }

        log::debug!("Graph from {} has {} node(s)", root, self.graph.len());
        self.graph
    }

    fn visit(&mut self, root: &str) {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.enter(root) {
            stack.push(frame);
        }

        while let Some(top) = stack.last_mut() {
            match top.pending.pop() {
                Some(next) => {
                    if let Some(frame) = self.enter(&next) {
                        stack.push(frame);
                    }
                }
                None => {
                    if let Some(frame) = stack.pop() {
                        self.states.insert(frame.file.clone(), VisitState::Done);
                        self.graph.insert(frame.file, frame.node);
                    }
                }
            }
        }
    }

    /// Mark `file` in progress and analyze it. `None` when there is
    /// nothing to follow: already seen, or unreadable.
    fn enter(&mut self, file: &str) -> Option<Frame> {
        if file.is_empty() {
            return None;
        }
        if let Some(state) = self.states.get(file) {
            log::debug!("Skipping {} ({:?})", file, state);
            return None;
        }
        self.states.insert(file.to_string(), VisitState::InProgress);

        match self.analyze(file) {
            Some((node, mut pending)) => {
                pending.reverse();
                Some(Frame {
                    file: file.to_string(),
                    node,
                    pending,
                })
            }
            None => {
                self.states.insert(file.to_string(), VisitState::Done);
                None
            }
        }
    }

    /// Node for `file` plus the files it leads to, in reference order.
    fn analyze(&self, file: &str) -> Option<(GraphNode, Vec<String>)> {
        let store = self.resolver.store();

        if !is_script(file) {
            if !store.is_file(file) {
                log::warn!("Cannot read {}: not a file", file);
                return None;
            }
            return Some((GraphNode::new(Dialect::UNKNOWN), Vec::new()));
        }

        let source = match store.get_contents(file) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Cannot read {}: {}", file, e);
                return None;
            }
        };

        let tree = parse_javascript(&source);
        let (references, dialect) = self.registry.find_references(&tree);
        let references = self.resolver.resolve_all(file, references);

        let mut next: Vec<String> = Vec::new();
        for reference in &references {
            if reference.ignore {
                continue;
            }
            if let Some(path) = &reference.path {
                if !is_synthetic(path) && !next.contains(path) {
                    next.push(path.clone());
                }
            }
        }

        log::debug!("{}: {} with {} reference(s)", file, dialect, references.len());
        Some((GraphNode::with_refs(dialect, references), next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryFileStore;
    use std::sync::Arc;

    fn build(store: MemoryFileStore, root: &str) -> Graph {
        let resolver = Resolver::new(Arc::new(store), Config::default());
        let registry = DialectRegistry::default();
        GraphBuilder::new(&resolver, &registry).build(root)
    }

    #[test]
    fn test_single_file_without_dependencies() {
        let graph = build(MemoryFileStore::new().with_file("a.js", "var x = 1;"), "a.js");
        assert_eq!(graph.len(), 1);
        assert_eq!(graph["a.js"].kind, Dialect::UNKNOWN);
        assert!(graph["a.js"].refs.is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let store = MemoryFileStore::new()
            .with_file("a.js", "require('./b');")
            .with_file("b.js", "require('./a');");
        let graph = build(store, "a.js");
        assert_eq!(graph.keys().collect::<Vec<_>>(), vec!["a.js", "b.js"]);
        assert_eq!(graph["a.js"].refs["./b"].path.as_deref(), Some("b.js"));
        assert_eq!(graph["b.js"].refs["./a"].path.as_deref(), Some("a.js"));
    }

    #[test]
    fn test_builtins_and_missing_are_not_followed() {
        let store = MemoryFileStore::new().with_file("main.js", "require('fs'); require('./gone');");
        let graph = build(store, "main.js");
        assert_eq!(graph.len(), 1);
        let node = &graph["main.js"];
        assert_eq!(node.kind, Dialect::COMMONJS);
        assert_eq!(node.refs["fs"].path.as_deref(), Some("node_natives/fs.js"));
        assert_eq!(node.refs["./gone"].path, None);
    }

    #[test]
    fn test_non_script_gets_unknown_node() {
        let store = MemoryFileStore::new()
            .with_file("app/view.js", "define(['text!./row.html'], function (row) {});")
            .with_file("app/row.html", "<tr></tr>");
        let graph = build(store, "app/view.js");
        assert_eq!(graph["app/view.js"].kind, Dialect::AMD);
        assert_eq!(graph["app/row.html"], GraphNode::new(Dialect::UNKNOWN));
    }

    #[test]
    fn test_missing_root_gives_empty_graph() {
        let graph = build(MemoryFileStore::new(), "nope.js");
        assert!(graph.is_empty());
    }

    #[test]
    fn test_node_json_shape() {
        let node = GraphNode::with_refs(
            Dialect::COMMONJS,
            vec![Reference::resolved(Dialect::COMMONJS, "./b", "b.js")],
        );
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::json!({
                "kind": "commonjs",
                "refs": { "./b": { "kind": "commonjs", "name": "./b", "path": "b.js" } }
            })
        );
    }
}
