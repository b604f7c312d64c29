//! Engine configuration.
//!
//! Loaded from a JSON file (typically `.jsdepend.json` at the project root)
//! or built in code; command-line flags override individual fields.

use crate::error::{DependError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by resolution and graph building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allow heuristic whole-project search for unresolved references.
    pub sloppy: bool,

    /// Object whose `require` calls form the namespaced dialect.
    pub namespace: String,

    /// Directory names skipped by project-wide scans.
    pub exclude_dirs: Vec<String>,

    /// Keep completed graphs in memory between requests.
    pub cache_graphs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sloppy: false,
            namespace: "goog".to_string(),
            exclude_dirs: vec!["node_modules".to_string(), ".git".to_string()],
            cache_graphs: true,
        }
    }
}

impl Config {
    /// Default name of the configuration file in a project root.
    pub const FILE_NAME: &'static str = ".jsdepend.json";

    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DependError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| DependError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `<root>/.jsdepend.json` if present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(Self::FILE_NAME);
        if path.is_file() {
            log::debug!("Loading configuration from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
