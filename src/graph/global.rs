//! Dependencies of plain scripts, inferred from the pages that load them.
//!
//! A script without module syntax shares one global scope with every
//! script loaded before it on the same page, so each of those counts as a
//! dependency.

use super::{Graph, GraphNode};
use crate::ingest::detect::Dialect;
use crate::ingest::imports::Reference;
use crate::resolve::markup::{is_page, script_tags};
use crate::store::{paths, FileStore};

/// A `<script src>` as written and as a project identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScript {
    /// The `src` attribute.
    pub src: String,
    /// Project identity, when the source lies inside the project.
    pub path: Option<String>,
}

/// Scripts a page loads through `src`, in document order.
pub fn page_scripts(store: &dyn FileStore, page: &str) -> Vec<PageScript> {
    let html = match store.get_contents(page) {
        Ok(html) => html,
        Err(e) => {
            log::warn!("Skipping unreadable page {}: {}", page, e);
            return Vec::new();
        }
    };
    let page_dir = paths::dirname(page);
    script_tags(&html)
        .into_iter()
        .filter_map(|tag| tag.src)
        .map(|src| {
            let path = src_path(page_dir, &src);
            PageScript { src, path }
        })
        .collect()
}

fn src_path(page_dir: &str, src: &str) -> Option<String> {
    if src.contains("://") || src.starts_with("//") {
        return None;
    }
    let src = src.split(['?', '#']).next().unwrap_or(src);
    match src.strip_prefix('/') {
        Some(absolute) => paths::normalize(absolute),
        None => paths::normalize(&paths::join(page_dir, src)),
    }
}

/// Nearest page, walking up from the script's directory, that loads
/// `script`. Returns the page and its scripts up to and including it.
pub fn find_loading_page(store: &dyn FileStore, script: &str) -> Option<(String, Vec<PageScript>)> {
    for dir in paths::ancestors(paths::dirname(script)) {
        let names = match store.list_files(dir) {
            Ok(names) => names,
            Err(e) => {
                log::debug!("Cannot list {}: {}", dir, e);
                continue;
            }
        };
        for name in names.iter().filter(|name| is_page(name)) {
            let page = paths::join(dir, name);
            let scripts = page_scripts(store, &page);
            if let Some(position) = scripts
                .iter()
                .position(|s| s.path.as_deref() == Some(script))
            {
                let mut scripts = scripts;
                scripts.truncate(position + 1);
                return Some((page, scripts));
            }
        }
    }
    None
}

/// Replace the root's node with `global` nodes derived from its page.
///
/// The root and every script loaded before it get a node whose refs are
/// the scripts preceding them. Returns false, leaving the graph alone,
/// when no page loads the root.
pub fn apply_page_scripts(store: &dyn FileStore, root: &str, graph: &mut Graph) -> bool {
    let Some((page, scripts)) = find_loading_page(store, root) else {
        log::debug!("No page loads {}", root);
        return false;
    };
    log::debug!("{} is loaded by {} after {} script(s)", root, page, scripts.len() - 1);

    for (index, script) in scripts.iter().enumerate() {
        let Some(path) = &script.path else {
            continue;
        };
        if path != root && !store.is_file(path) {
            continue;
        }
        let refs = scripts[..index].iter().map(|before| Reference {
            path: before.path.clone().filter(|p| store.is_file(p)),
            ..Reference::new(Dialect::GLOBAL, before.src.clone())
        });
        graph.insert(path.clone(), GraphNode::with_refs(Dialect::GLOBAL, refs));
    }
    true
}
