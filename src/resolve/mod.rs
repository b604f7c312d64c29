//! Reference resolution.
//!
//! Turns raw reference names into project file identities. Each reference
//! goes through a fixed pipeline and the first stage that finds an
//! existing file wins:
//!
//! 1. Loader-plugin prefixes (`text!`, `i18n!`; others are ignored)
//! 2. Relative names, against the declaring file's directory
//! 3. Dialect-specific lookup: AMD loader configuration, Node built-ins and
//!    `node_modules`, or the namespace provide index
//! 4. Sloppy whole-project search, when enabled
//!
//! Unresolved references come back without a `path`. Nothing here fails.

pub mod amd_config;
pub mod loader;
pub mod markup;
pub mod module_resolver;
pub mod provides;
pub mod sloppy;

use crate::config::Config;
use crate::ingest::detect::Dialect;
use crate::ingest::imports::{Candidate, Reference};
use crate::store::{paths, walk_files, FileStore};
use amd_config::{config_for, AmdConfig};
use loader::{parse_target, Target};
use module_resolver::{builtin_path, find_in_node_modules, resolve_file_or_directory};
use provides::ProvideIndex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// One reference or a list of them; resolution preserves the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolvable {
    /// A single reference.
    One(Reference),
    /// A list of references, resolved in order.
    Many(Vec<Reference>),
}

impl From<Reference> for Resolvable {
    fn from(reference: Reference) -> Self {
        Resolvable::One(reference)
    }
}

impl From<Vec<Reference>> for Resolvable {
    fn from(references: Vec<Reference>) -> Self {
        Resolvable::Many(references)
    }
}

enum Outcome {
    Ignored,
    Found(String),
    Guessed(Vec<Candidate>),
    Missing,
}

/// Resolves references against one project.
///
/// Project-wide facts (loader configurations, the provide index, the file
/// list for sloppy search) are computed on first use and then reused.
pub struct Resolver {
    store: Arc<dyn FileStore>,
    config: Config,
    amd_configs: OnceLock<Vec<AmdConfig>>,
    provides: OnceLock<ProvideIndex>,
    project_files: OnceLock<Vec<String>>,
}

impl Resolver {
    /// Create a resolver over `store`.
    pub fn new(store: Arc<dyn FileStore>, config: Config) -> Self {
        Self {
            store,
            config,
            amd_configs: OnceLock::new(),
            provides: OnceLock::new(),
            project_files: OnceLock::new(),
        }
    }

    /// The underlying file store.
    pub fn store(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    /// The configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loader configurations declared by the project's pages.
    pub fn amd_configs(&self) -> &[AmdConfig] {
        self.amd_configs
            .get_or_init(|| amd_config::discover(self.store(), &self.config.exclude_dirs))
    }

    fn provides(&self) -> &ProvideIndex {
        self.provides.get_or_init(|| {
            ProvideIndex::build(self.store(), &self.config.namespace, &self.config.exclude_dirs)
        })
    }

    fn project_files(&self) -> &[String] {
        self.project_files
            .get_or_init(|| walk_files(self.store(), "", &self.config.exclude_dirs))
    }

    /// Resolve references mentioned in `file`, keeping their shape.
    pub fn resolve(&self, file: &str, target: Resolvable) -> Resolvable {
        match target {
            Resolvable::One(reference) => Resolvable::One(self.resolve_one(file, reference)),
            Resolvable::Many(references) => Resolvable::Many(self.resolve_all(file, references)),
        }
    }

    /// Resolve a list of references mentioned in `file`.
    pub fn resolve_all(&self, file: &str, references: Vec<Reference>) -> Vec<Reference> {
        references
            .into_iter()
            .map(|reference| self.resolve_one(file, reference))
            .collect()
    }

    /// Resolve one reference mentioned in `file`.
    pub fn resolve_one(&self, file: &str, mut reference: Reference) -> Reference {
        match self.locate(file, &reference.kind, &reference.name) {
            Outcome::Ignored => {
                log::debug!("Ignoring '{}' in {}: unsupported loader plugin", reference.name, file);
                reference.ignore = true;
            }
            Outcome::Found(path) => reference.path = Some(path),
            Outcome::Guessed(candidates) => {
                log::debug!(
                    "Guessed '{}' in {} from {} candidate(s)",
                    reference.name,
                    file,
                    candidates.len()
                );
                reference.path = candidates.first().map(|c| c.path.clone());
                reference.candidates = Some(candidates);
            }
            Outcome::Missing => {
                log::debug!("Unresolved '{}' in {}", reference.name, file);
            }
        }
        reference
    }

    fn locate(&self, file: &str, kind: &Dialect, raw: &str) -> Outcome {
        let target = parse_target(raw);
        let Some(name) = target.name() else {
            return Outcome::Ignored;
        };
        if name.is_empty() {
            return Outcome::Missing;
        }

        if let Some(path) = self.locate_exact(file, kind, &target, name) {
            return Outcome::Found(path);
        }

        if self.config.sloppy {
            let mut candidates = sloppy::candidates(&target, self.project_files());
            candidates.retain(|candidate| candidate.path != file);
            if !candidates.is_empty() {
                return Outcome::Guessed(candidates);
            }
        }
        Outcome::Missing
    }

    fn locate_exact(&self, file: &str, kind: &Dialect, target: &Target<'_>, name: &str) -> Option<String> {
        if is_relative(name) {
            return self.locate_relative(file, kind, target, name);
        }

        if kind.is_commonjs() {
            if !target.is_module() {
                return None;
            }
            builtin_path(name).or_else(|| find_in_node_modules(self.store(), paths::dirname(file), name))
        } else if *kind == Dialect::NAMESPACED {
            self.provides().lookup(name).map(str::to_string)
        } else {
            self.locate_declared(file, target, name)
        }
    }

    fn locate_relative(&self, file: &str, kind: &Dialect, target: &Target<'_>, name: &str) -> Option<String> {
        let joined = paths::normalize(&paths::join(paths::dirname(file), name))?;
        if !target.is_module() {
            return self.existing_file(joined);
        }
        if kind.is_commonjs() {
            resolve_file_or_directory(self.store(), &joined)
        } else {
            self.existing_script(&joined)
        }
    }

    fn locate_declared(&self, file: &str, target: &Target<'_>, name: &str) -> Option<String> {
        let mapped = match config_for(self.amd_configs(), file) {
            Some(config) => config.map_module(name)?,
            None => paths::normalize(&paths::join(paths::dirname(file), name))?,
        };
        if target.is_module() {
            self.existing_script(&mapped)
        } else {
            self.existing_file(mapped)
        }
    }

    fn existing_file(&self, path: String) -> Option<String> {
        (!path.is_empty() && self.store.is_file(&path)).then_some(path)
    }

    /// `<base>.js`, or `base` itself when it already names a script.
    fn existing_script(&self, base: &str) -> Option<String> {
        if base.ends_with(".js") && self.store.is_file(base) {
            return Some(base.to_string());
        }
        self.existing_file(format!("{}.js", base))
    }
}

/// Whether a module name is relative to the declaring file.
pub fn is_relative(name: &str) -> bool {
    name == "." || name == ".." || name.starts_with("./") || name.starts_with("../")
}
