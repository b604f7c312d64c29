//! AMD loader configuration discovered from the project's HTML pages.
//!
//! Pages name the loader's configuration in one of a few ways: an inline
//! `require.config({...})` / `requirejs.config({...})`, a global
//! `var require = {...}` declared before the loader, or the same forms
//! inside the `data-main` entry script. Only literal values are read.

use super::markup::{is_page, script_tags};
use crate::pattern::estree::{call, identifier, identifier_in, member};
use crate::pattern::{
    array_element_pat, contains_pat, get_field_pat, object_pat, or_pat, type_pat, Pattern,
};
use crate::store::{paths, walk_files, FileStore};
use crate::syntax::{literal_value, node_type, parse_javascript};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Literal loader settings as written in a configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderSettings {
    /// Base directory for module names, relative to the page.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Module-name prefix aliases.
    #[serde(default)]
    pub paths: BTreeMap<String, PathAlias>,

    /// Package declarations.
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
}

/// Target of a `paths` entry. Arrays list fallbacks; the first is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathAlias {
    /// A single location.
    One(String),
    /// Locations tried in order by the loader.
    Fallbacks(Vec<String>),
}

impl PathAlias {
    fn primary(&self) -> Option<&str> {
        match self {
            PathAlias::One(location) => Some(location),
            PathAlias::Fallbacks(locations) => locations.first().map(String::as_str),
        }
    }
}

/// A `packages` entry: either a bare name or a full description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PackageSpec {
    /// Package whose location is its name and whose main is `main`.
    Name(String),
    /// Package with explicit location and main module.
    Full {
        /// Package name as used in module ids.
        name: String,
        /// Directory relative to the base.
        #[serde(default)]
        location: Option<String>,
        /// Main module relative to the location.
        #[serde(default)]
        main: Option<String>,
    },
}

impl PackageSpec {
    fn name(&self) -> &str {
        match self {
            PackageSpec::Name(name) | PackageSpec::Full { name, .. } => name,
        }
    }

    fn location(&self) -> &str {
        match self {
            PackageSpec::Name(name) => name,
            PackageSpec::Full { location, name, .. } => location.as_deref().unwrap_or(name),
        }
    }

    fn main(&self) -> &str {
        match self {
            PackageSpec::Full { main: Some(main), .. } => main.strip_suffix(".js").unwrap_or(main),
            _ => "main",
        }
    }
}

/// Configuration declared by one page, with its base directory resolved
/// to a project identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmdConfig {
    /// Page that declared the configuration.
    pub page: String,
    /// Project-relative base directory for module names.
    pub base_dir: String,
    /// The literal settings.
    pub settings: LoaderSettings,
}

impl AmdConfig {
    /// Configuration rooted at `base_dir` with no aliases.
    pub fn with_base(page: impl Into<String>, base_dir: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            base_dir: base_dir.into(),
            settings: LoaderSettings::default(),
        }
    }

    /// Map a module id onto a project path, before any suffix is added.
    ///
    /// `paths` aliases apply with the longest matching segment prefix,
    /// then packages, then the base directory. Returns `None` for ids that
    /// leave the project (URLs, paths above the root).
    pub fn map_module(&self, id: &str) -> Option<String> {
        if id.contains("://") || id.starts_with("//") {
            return None;
        }
        if let Some(absolute) = id.strip_prefix('/') {
            return paths::normalize(absolute);
        }

        let aliased = self.apply_paths(id);
        let mapped = match aliased {
            Some(location) => location,
            None => self.apply_packages(id).unwrap_or_else(|| id.to_string()),
        };

        if let Some(absolute) = mapped.strip_prefix('/') {
            return paths::normalize(absolute);
        }
        paths::normalize(&paths::join(&self.base_dir, &mapped))
    }

    fn apply_paths(&self, id: &str) -> Option<String> {
        let (prefix, alias) = self
            .settings
            .paths
            .iter()
            .filter(|(prefix, _)| segment_prefix(id, prefix).is_some())
            .max_by_key(|(prefix, _)| prefix.len())?;
        let location = alias.primary()?;
        let rest = segment_prefix(id, prefix)?;
        Some(if rest.is_empty() {
            location.to_string()
        } else {
            paths::join(location, rest)
        })
    }

    fn apply_packages(&self, id: &str) -> Option<String> {
        let package = self
            .settings
            .packages
            .iter()
            .find(|package| segment_prefix(id, package.name()).is_some())?;
        let rest = segment_prefix(id, package.name())?;
        let inside = if rest.is_empty() { package.main() } else { rest };
        Some(paths::join(package.location(), inside))
    }
}

/// Remainder of `id` after `prefix` when the prefix ends on a segment
/// boundary.
fn segment_prefix<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = id.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// The configuration that applies to `file`: the one whose base directory
/// most closely contains it, else the first discovered.
pub fn config_for<'c>(configs: &'c [AmdConfig], file: &str) -> Option<&'c AmdConfig> {
    configs
        .iter()
        .filter(|config| paths::is_within(file, &config.base_dir))
        .max_by_key(|config| config.base_dir.len())
        .or_else(|| configs.first())
}

/// Discover loader configurations from every page of the project.
pub fn discover(store: &dyn FileStore, exclude: &[String]) -> Vec<AmdConfig> {
    let configs: Vec<AmdConfig> = walk_files(store, "", exclude)
        .iter()
        .filter(|handle| is_page(handle))
        .filter_map(|page| page_config(store, page))
        .collect();
    log::debug!("Discovered {} AMD loader configuration(s)", configs.len());
    configs
}

/// Loader configuration declared by one page, if any.
pub fn page_config(store: &dyn FileStore, page: &str) -> Option<AmdConfig> {
    let html = match store.get_contents(page) {
        Ok(html) => html,
        Err(e) => {
            log::warn!("Skipping unreadable page {}: {}", page, e);
            return None;
        }
    };
    let page_dir = paths::dirname(page);

    let mut found = false;
    let mut settings = LoaderSettings::default();
    let mut main_dir: Option<String> = None;

    for tag in script_tags(&html) {
        if !tag.body.trim().is_empty() {
            for object in config_objects(&tag.body) {
                found = true;
                merge(&mut settings, object, page);
            }
        }

        let Some(data_main) = tag.data_main else {
            continue;
        };
        found = true;
        let Some(main) = paths::normalize(&paths::join(page_dir, &data_main)) else {
            log::warn!("data-main '{}' in {} leaves the project", data_main, page);
            continue;
        };
        let main = if paths::extension(&main) == Some("js") {
            main
        } else {
            format!("{}.js", main)
        };
        main_dir.get_or_insert_with(|| paths::dirname(&main).to_string());
        match store.get_contents(&main) {
            Ok(source) => {
                for object in config_objects(&source) {
                    merge(&mut settings, object, &main);
                }
            }
            Err(e) => log::debug!("data-main script {} not readable: {}", main, e),
        }
    }

    if !found {
        return None;
    }

    let base_dir = match settings.base_url.as_deref() {
        Some(base_url) => {
            let joined = match base_url.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => paths::join(page_dir, base_url),
            };
            paths::normalize(&joined).unwrap_or_else(|| {
                log::warn!("baseUrl '{}' in {} leaves the project", base_url, page);
                page_dir.to_string()
            })
        }
        None => main_dir.unwrap_or_else(|| page_dir.to_string()),
    };

    log::debug!("Page {} configures AMD base '{}'", page, base_dir);
    Some(AmdConfig {
        page: page.to_string(),
        base_dir,
        settings,
    })
}

fn merge(settings: &mut LoaderSettings, object: Value, origin: &str) {
    let parsed: LoaderSettings = match serde_json::from_value(object) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Ignoring malformed loader configuration in {}: {}", origin, e);
            return;
        }
    };
    if parsed.base_url.is_some() {
        settings.base_url = parsed.base_url;
    }
    settings.paths.extend(parsed.paths);
    settings.packages.extend(parsed.packages);
}

/// Literal configuration objects declared in a script, in source order.
///
/// Properties whose values are not literals are dropped.
pub fn config_objects(source: &str) -> Vec<Value> {
    let tree = parse_javascript(source);
    config_pattern()
        .solutions(&tree)
        .into_iter()
        .filter_map(|result| result.value())
        .filter_map(lenient_object)
        .collect()
}

fn config_pattern() -> Pattern {
    let loader = || identifier_in(&["require", "requirejs"]);
    let object = || type_pat("ObjectExpression");

    let config_call = array_element_pat(
        get_field_pat(call(member(loader(), "config")), "arguments"),
        object(),
    );
    let declared = get_field_pat(
        object_pat([
            ("type", Pattern::from("VariableDeclarator")),
            ("id", identifier("require")),
            ("init", object()),
        ]),
        "init",
    );
    let assigned = get_field_pat(
        object_pat([
            ("type", Pattern::from("AssignmentExpression")),
            ("operator", Pattern::from("=")),
            ("left", loader()),
            ("right", object()),
        ]),
        "right",
    );

    contains_pat(or_pat([config_call, declared, assigned]))
}

fn lenient_object(node: &Value) -> Option<Value> {
    if node_type(node)? != "ObjectExpression" {
        return None;
    }
    let mut object = Map::new();
    for property in node.get("properties")?.as_array()? {
        let key = property.get("key").and_then(|key| {
            key.get("name")
                .or_else(|| key.get("value"))
                .and_then(Value::as_str)
        });
        let value = property.get("value").and_then(literal_value);
        if let (Some(key), Some(value)) = (key, value) {
            object.insert(key.to_string(), value);
        }
    }
    Some(Value::Object(object))
}
