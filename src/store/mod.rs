//! File store contract consumed by the resolver and the graph builder.
//!
//! Handles are project-relative paths (see [`paths`]). The core only needs
//! file contents, directory listings and type queries; where the files
//! actually live is up to the implementation.

pub mod local;
pub mod memory;
pub mod paths;

use crate::error::Result;

pub use local::LocalFileStore;
pub use memory::MemoryFileStore;

/// Abstract read-only file storage.
pub trait FileStore: Send + Sync {
    /// Contents of a file.
    fn get_contents(&self, handle: &str) -> Result<String>;

    /// Names (not paths) of the entries of a directory, sorted.
    fn list_files(&self, handle: &str) -> Result<Vec<String>>;

    /// Whether the handle names a directory.
    fn is_directory(&self, handle: &str) -> bool;

    /// Whether the handle names a regular file.
    fn is_file(&self, handle: &str) -> bool;
}

/// Every file below `dir`, depth first, in listing order.
///
/// Directories whose name is in `exclude` or starts with a dot are not
/// entered. Unreadable directories are logged and skipped.
pub fn walk_files(store: &dyn FileStore, dir: &str, exclude: &[String]) -> Vec<String> {
    let mut files = Vec::new();
    collect_files(store, dir, exclude, &mut files);
    files
}

fn collect_files(store: &dyn FileStore, dir: &str, exclude: &[String], files: &mut Vec<String>) {
    let names = match store.list_files(dir) {
        Ok(names) => names,
        Err(e) => {
            log::warn!("Skipping unreadable directory '{}': {}", dir, e);
            return;
        }
    };

    for name in names {
        let handle = paths::join(dir, &name);
        if store.is_directory(&handle) {
            if name.starts_with('.') || exclude.iter().any(|excluded| *excluded == name) {
                continue;
            }
            collect_files(store, &handle, exclude, files);
        } else {
            files.push(handle);
        }
    }
}
