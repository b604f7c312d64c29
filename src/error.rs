//! jsdepend error types.
//!
//! All errors are typed and provide root cause information. Unresolved
//! references and unparseable sources are not errors; see the resolver
//! and syntax modules.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for jsdepend operations.
#[derive(Error, Debug)]
pub enum DependError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file handle does not exist in the file store.
    #[error("File not found: {0}")]
    NotFound(String),

    /// A handle was listed as a directory but is not one.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A handle escapes the project root.
    #[error("Handle '{0}' is outside the project root")]
    OutsideRoot(String),

    /// Configuration could not be loaded.
    #[error("Invalid configuration in {path}: {message}")]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl DependError {
    /// Stable identifier of the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            DependError::Io { .. } => "Io",
            DependError::NotFound(_) => "NotFound",
            DependError::NotADirectory(_) => "NotADirectory",
            DependError::OutsideRoot(_) => "OutsideRoot",
            DependError::Config { .. } => "Config",
            DependError::Json(_) => "Json",
            DependError::Other(_) => "Other",
        }
    }

    /// The file or handle the error concerns, when known.
    pub fn handle(&self) -> Option<String> {
        match self {
            DependError::Io { path, .. } | DependError::Config { path, .. } => {
                Some(path.display().to_string())
            }
            DependError::NotFound(handle)
            | DependError::NotADirectory(handle)
            | DependError::OutsideRoot(handle) => Some(handle.clone()),
            DependError::Json(_) | DependError::Other(_) => None,
        }
    }
}

/// Result type alias for jsdepend operations.
pub type Result<T> = std::result::Result<T, DependError>;
