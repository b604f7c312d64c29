//! Source → parse tree → dialect → raw references.
//!
//! This module classifies a file's module dialect and extracts the
//! references it declares. Nothing here touches the file store.

pub mod detect;
pub mod dispatch;
pub mod imports;

pub use detect::{Dialect, ModuleClassifier};
pub use dispatch::{extract_references, DialectRegistry};
pub use imports::{Candidate, Reference, ReferenceFinder};

/// Extensions of files parsed as scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Whether a file identity names a script by its extension.
pub fn is_script(handle: &str) -> bool {
    crate::store::paths::extension(handle)
        .map(|ext| SCRIPT_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
