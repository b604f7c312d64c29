//! jsdepend: dependency analysis for JavaScript projects.
//!
//! This library classifies script files by module dialect (AMD, CommonJS,
//! namespaced or plain global scripts), extracts the references they make,
//! resolves those references to project files and builds dependency graphs
//! over a pluggable file store.

#![warn(missing_docs)]
// env_logger is used by src/main.rs (binary), not this library
#![expect(unused_crate_dependencies)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod pattern;
pub mod resolve;
pub mod store;
pub mod syntax;

/// Re-export common error types for convenience.
pub use error::{DependError, Result};

/// Re-export the main entry points for convenience.
pub use config::Config;
pub use engine::DependencyEngine;
pub use graph::{Graph, GraphNode};
pub use ingest::detect::Dialect;
pub use ingest::imports::{Candidate, Reference};
pub use resolve::Resolvable;
pub use store::{FileStore, LocalFileStore, MemoryFileStore};

/// jsdepend version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
