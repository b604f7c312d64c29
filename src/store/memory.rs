//! In-memory file store.

use super::{paths, FileStore};
use crate::error::{DependError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Files held in a map from handle to contents. Directories exist
/// implicitly as prefixes of file handles.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: BTreeMap<String, String>,
}

impl MemoryFileStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemoryFileStore::insert`].
    pub fn with_file(mut self, handle: &str, contents: &str) -> Self {
        self.insert(handle, contents);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, handle: &str, contents: &str) {
        let key = paths::normalize(handle).unwrap_or_else(|| handle.to_string());
        self.files.insert(key, contents.to_string());
    }

    fn key(handle: &str) -> Result<String> {
        paths::normalize(handle).ok_or_else(|| DependError::OutsideRoot(handle.to_string()))
    }
}

impl FileStore for MemoryFileStore {
    fn get_contents(&self, handle: &str) -> Result<String> {
        let key = Self::key(handle)?;
        self.files
            .get(&key)
            .cloned()
            .ok_or(DependError::NotFound(key))
    }

    fn list_files(&self, handle: &str) -> Result<Vec<String>> {
        let key = Self::key(handle)?;
        if !self.is_directory(&key) {
            return Err(DependError::NotADirectory(key));
        }
        let prefix = if key.is_empty() { String::new() } else { format!("{}/", key) };
        let names: BTreeSet<String> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }

    fn is_directory(&self, handle: &str) -> bool {
        match Self::key(handle) {
            Ok(key) if key.is_empty() => true,
            Ok(key) => {
                let prefix = format!("{}/", key);
                self.files.keys().any(|file| file.starts_with(&prefix))
            }
            Err(_) => false,
        }
    }

    fn is_file(&self, handle: &str) -> bool {
        Self::key(handle)
            .map(|key| self.files.contains_key(&key))
            .unwrap_or(false)
    }
}
