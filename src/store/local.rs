//! File store over a directory on local disk.

use super::{paths, FileStore};
use crate::error::{DependError, Result};
use std::path::{Path, PathBuf};

/// Serves handles relative to a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root on disk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project-relative handle of an on-disk path below the root.
    pub fn handle_for(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| DependError::OutsideRoot(path.display().to_string()))?;
        let text = relative
            .to_str()
            .ok_or_else(|| DependError::Other(format!("Invalid UTF-8 in path: {:?}", path)))?;
        paths::normalize(text).ok_or_else(|| DependError::OutsideRoot(text.to_string()))
    }

    fn disk_path(&self, handle: &str) -> Result<PathBuf> {
        let normalized =
            paths::normalize(handle).ok_or_else(|| DependError::OutsideRoot(handle.to_string()))?;
        Ok(self.root.join(normalized))
    }
}

impl FileStore for LocalFileStore {
    fn get_contents(&self, handle: &str) -> Result<String> {
        let path = self.disk_path(handle)?;
        if !path.is_file() {
            return Err(DependError::NotFound(handle.to_string()));
        }
        let bytes = std::fs::read(&path).map_err(|source| DependError::Io {
            path: path.clone(),
            source,
        })?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                log::debug!("{} is not valid UTF-8, decoding lossily", handle);
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    fn list_files(&self, handle: &str) -> Result<Vec<String>> {
        let path = self.disk_path(handle)?;
        if !path.is_dir() {
            return Err(DependError::NotADirectory(handle.to_string()));
        }
        let entries = std::fs::read_dir(&path).map_err(|source| DependError::Io {
            path: path.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DependError::Io {
                path: path.clone(),
                source,
            })?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn is_directory(&self, handle: &str) -> bool {
        self.disk_path(handle).map(|p| p.is_dir()).unwrap_or(false)
    }

    fn is_file(&self, handle: &str) -> bool {
        self.disk_path(handle).map(|p| p.is_file()).unwrap_or(false)
    }
}
