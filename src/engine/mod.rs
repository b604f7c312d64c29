//! The dependency engine: one project, one configuration.
//!
//! Combines a file store, the dialect registry and a resolver, and keeps
//! completed graphs so repeated requests for the same root are cheap.

use crate::config::Config;
use crate::error::Result;
use crate::graph::{Graph, GraphBuilder};
use crate::ingest::detect::Dialect;
use crate::ingest::dispatch::DialectRegistry;
use crate::ingest::imports::Reference;
use crate::resolve::{Resolvable, Resolver};
use crate::store::{paths, FileStore};
use crate::syntax::parse_javascript;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Answers dependency questions about one project.
pub struct DependencyEngine {
    store: Arc<dyn FileStore>,
    config: Config,
    registry: DialectRegistry,
    resolver: RwLock<Arc<Resolver>>,
    graphs: Mutex<HashMap<String, Graph>>,
}

impl DependencyEngine {
    /// Engine with the built-in dialects.
    pub fn new(store: Arc<dyn FileStore>, config: Config) -> Self {
        let registry = DialectRegistry::new(&config.namespace);
        Self::with_registry(store, config, registry)
    }

    /// Engine with a caller-supplied dialect registry.
    pub fn with_registry(store: Arc<dyn FileStore>, config: Config, registry: DialectRegistry) -> Self {
        let resolver = Resolver::new(Arc::clone(&store), config.clone());
        Self {
            store,
            config,
            registry,
            resolver: RwLock::new(Arc::new(resolver)),
            graphs: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The dialect registry in use.
    pub fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    fn resolver(&self) -> Arc<Resolver> {
        let guard = self.resolver.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    fn graphs(&self) -> MutexGuard<'_, HashMap<String, Graph>> {
        self.graphs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn source(&self, handle: &str) -> Result<String> {
        self.store.get_contents(handle)
    }

    /// Dialect of a file.
    pub fn classify(&self, handle: &str) -> Result<Dialect> {
        let tree = parse_javascript(&self.source(handle)?);
        Ok(self.registry.classify(&tree))
    }

    /// Resolved direct references of a file, with its dialect.
    pub fn get_dependencies(&self, handle: &str) -> Result<(Vec<Reference>, Dialect)> {
        let tree = parse_javascript(&self.source(handle)?);
        let (references, dialect) = self.registry.find_references(&tree);
        let references = self.resolver().resolve_all(handle, references);
        Ok((references, dialect))
    }

    /// Resolve references as if mentioned in `handle`.
    pub fn resolve(&self, handle: &str, target: Resolvable) -> Resolvable {
        self.resolver().resolve(handle, target)
    }

    /// Dependency graph reachable from `handle`.
    ///
    /// Read failures inside the graph are logged and leave the affected
    /// part out; this never fails.
    pub fn get_dgraph(&self, handle: &str) -> Graph {
        let key = paths::normalize(handle).unwrap_or_else(|| handle.to_string());
        if self.config.cache_graphs {
            if let Some(graph) = self.graphs().get(&key) {
                log::debug!("Graph cache hit for {}", key);
                return graph.clone();
            }
        }

        let resolver = self.resolver();
        let graph = GraphBuilder::new(&resolver, &self.registry).build(&key);

        if self.config.cache_graphs {
            self.graphs().insert(key, graph.clone());
        }
        graph
    }

    /// Forget cached graphs and project-wide resolution facts.
    pub fn clear_cache(&self) {
        self.graphs().clear();
        let fresh = Arc::new(Resolver::new(Arc::clone(&self.store), self.config.clone()));
        let mut guard = self.resolver.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DependError;
    use crate::store::MemoryFileStore;

    fn engine(store: MemoryFileStore) -> DependencyEngine {
        DependencyEngine::new(Arc::new(store), Config::default())
    }

    #[test]
    fn test_get_dependencies() {
        let e = engine(
            MemoryFileStore::new()
                .with_file("main.js", "define(['./a', 'domReady!'], function (a) {});")
                .with_file("a.js", ""),
        );
        let (refs, dialect) = e.get_dependencies("main.js").unwrap();
        assert_eq!(dialect, Dialect::AMD);
        assert_eq!(refs[0].path.as_deref(), Some("a.js"));
        assert!(refs[1].ignore);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let e = engine(MemoryFileStore::new());
        assert!(matches!(e.classify("x.js"), Err(DependError::NotFound(_))));
        assert!(e.get_dependencies("x.js").is_err());
    }

    #[test]
    fn test_cached_graph_until_cleared() {
        let e = engine(MemoryFileStore::new().with_file("a.js", "require('./b');").with_file("b.js", ""));
        let first = e.get_dgraph("a.js");
        assert_eq!(first.len(), 2);
        assert_eq!(e.get_dgraph("./a.js"), first);
        assert_eq!(e.graphs().len(), 1);
        e.clear_cache();
        assert!(e.graphs().is_empty());
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let e = Arc::new(engine(
            MemoryFileStore::new().with_file("a.js", "require('./b');").with_file("b.js", "require('./a');"),
        ));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let e = Arc::clone(&e);
                std::thread::spawn(move || e.get_dgraph("a.js").len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
