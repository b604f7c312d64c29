//! Command-line interface for jsdepend.
//!
//! This module handles argument parsing and output payloads only.
//! Analysis is delegated to [`crate::engine::DependencyEngine`].

use crate::config::Config;
use crate::error::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// jsdepend: dependency analysis for AMD, CommonJS and plain-script projects.
#[derive(Parser, Debug)]
#[command(name = "jsdepend")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root directory.
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (defaults to `<root>/.jsdepend.json` when present).
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Guess unresolved references by searching the whole project.
    #[arg(long, global = true)]
    pub sloppy: bool,
}

/// Available jsdepend commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the module dialect of a file.
    Classify {
        /// Project-relative path of the file.
        file: String,
    },

    /// Print the resolved direct dependencies of a file.
    Deps {
        /// Project-relative path of the file.
        file: String,
    },

    /// Print the dependency graph reachable from a file.
    Graph {
        /// Project-relative path of the root file.
        file: String,
    },

    /// Resolve module names as if mentioned in a file.
    Resolve {
        /// Project-relative path of the declaring file.
        file: String,

        /// Names to resolve, as written in source.
        #[arg(required = true)]
        names: Vec<String>,

        /// Dialect the names belong to.
        #[arg(short, long, default_value = "commonjs")]
        dialect: String,
    },
}

impl Cli {
    /// Effective configuration: the file named by `--config`, else the
    /// project's own, with command-line overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover(&self.root)?,
        };
        if self.sloppy {
            config.sloppy = true;
        }
        Ok(config)
    }
}

/// Parse command-line arguments.
///
/// Returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Structured error details.
    pub error: ErrorDetails,
}

/// Details for a CLI error payload.
#[derive(Serialize)]
pub struct ErrorDetails {
    /// Error kind identifier (NotFound, etc.).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CliErrorPayload {
    /// Build payload from a DependError instance.
    pub fn from_error(error: &crate::DependError) -> Self {
        CliErrorPayload {
            status: "error",
            error: ErrorDetails {
                kind: error.kind(),
                message: error.to_string(),
                file: error.handle(),
            },
        }
    }

    /// The payload as JSON.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
