//! Node-style module resolution.
//!
//! Handles built-in platform modules, file-or-directory lookup and the
//! nested `node_modules` search used by the CommonJS dialect.

use crate::store::{paths, FileStore};
use serde_json::Value;

/// Directory prefix of the synthetic identities given to built-in modules.
pub const NODE_NATIVES_DIR: &str = "node_natives";

/// Core modules shipped with the Node runtime.
pub const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Synthetic identity for a built-in module name, if it is one.
///
/// The `node:` scheme is accepted. The result never depends on project
/// contents.
///
/// # Example
/// ```
/// # use jsdepend::resolve::module_resolver::builtin_path;
/// assert_eq!(builtin_path("fs"), Some("node_natives/fs.js".to_string()));
/// assert_eq!(builtin_path("node:path"), Some("node_natives/path.js".to_string()));
/// assert_eq!(builtin_path("lodash"), None);
/// ```
pub fn builtin_path(name: &str) -> Option<String> {
    let bare = name.strip_prefix("node:").unwrap_or(name);
    BUILTIN_MODULES
        .contains(&bare)
        .then(|| format!("{}/{}.js", NODE_NATIVES_DIR, bare))
}

/// Whether an identity is a synthetic built-in module rather than a
/// project file.
pub fn is_synthetic(path: &str) -> bool {
    path.strip_prefix(NODE_NATIVES_DIR)
        .map_or(false, |rest| rest.starts_with('/'))
}

/// Resolve `candidate` the way `require` resolves a path: the file itself,
/// then `<candidate>.js`, then as a directory (package `main`, then
/// `index.js`).
pub fn resolve_file_or_directory(store: &dyn FileStore, candidate: &str) -> Option<String> {
    if !candidate.is_empty() && store.is_file(candidate) {
        return Some(candidate.to_string());
    }
    let with_js = format!("{}.js", candidate);
    if store.is_file(&with_js) {
        return Some(with_js);
    }
    resolve_directory(store, candidate)
}

/// Resolve a directory through its `package.json` `main`, then `index.js`.
pub fn resolve_directory(store: &dyn FileStore, dir: &str) -> Option<String> {
    if !store.is_directory(dir) {
        return None;
    }
    if let Some(entry) = package_main(store, dir) {
        return Some(entry);
    }
    let index = paths::join(dir, "index.js");
    store.is_file(&index).then_some(index)
}

/// Entry point named by `<dir>/package.json`.
///
/// Missing or malformed manifests, and a `main` that is not a string,
/// mean "no entry here". The entry is tried as a file, with `.js`, and as
/// a directory holding `index.js`.
pub fn package_main(store: &dyn FileStore, dir: &str) -> Option<String> {
    let manifest_path = paths::join(dir, "package.json");
    if !store.is_file(&manifest_path) {
        return None;
    }
    let text = match store.get_contents(&manifest_path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Cannot read {}: {}", manifest_path, e);
            return None;
        }
    };
    let manifest: Value = match serde_json::from_str(&text) {
        Ok(manifest) => manifest,
        Err(e) => {
            log::warn!("Skipping malformed {}: {}", manifest_path, e);
            return None;
        }
    };
    let main = match manifest.get("main") {
        None => return None,
        Some(Value::String(main)) => main,
        Some(other) => {
            log::warn!("Ignoring non-string main in {}: {}", manifest_path, other);
            return None;
        }
    };

    let entry = paths::normalize(&paths::join(dir, main))?;
    if entry.is_empty() || entry == dir {
        return None;
    }
    let with_js = format!("{}.js", entry);
    let index = paths::join(&entry, "index.js");
    [entry, with_js, index]
        .into_iter()
        .find(|candidate| store.is_file(candidate))
}

/// Search `node_modules` directories from `from_dir` up to the root.
///
/// The nearest directory holding a match wins.
pub fn find_in_node_modules(store: &dyn FileStore, from_dir: &str, name: &str) -> Option<String> {
    for dir in paths::ancestors(from_dir) {
        let modules = paths::join(dir, "node_modules");
        if !store.is_directory(&modules) {
            continue;
        }
        let Some(base) = paths::normalize(&paths::join(&modules, name)) else {
            continue;
        };
        if !paths::is_within(&base, &modules) {
            continue;
        }
        if let Some(found) = resolve_file_or_directory(store, &base) {
            log::debug!("Resolved '{}' from {} to {}", name, from_dir, found);
            return Some(found);
        }
    }
    None
}
