//! jsdepend CLI binary
//!
//! The CLI is a thin adapter over the library's engine. Results are
//! printed to stdout as pretty JSON; errors go to stderr as a JSON payload.

use jsdepend::cli::{CliErrorPayload, Commands};
use jsdepend::engine::DependencyEngine;
use jsdepend::ingest::detect::Dialect;
use jsdepend::ingest::imports::Reference;
use jsdepend::resolve::Resolvable;
use jsdepend::store::LocalFileStore;
use serde_json::{json, Value};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = jsdepend::cli::parse_args();

    if cli.verbose {
        env_logger::init();
    }

    let result = cli.load_config().and_then(|config| {
        let store = LocalFileStore::new(&cli.root);
        let engine = DependencyEngine::new(Arc::new(store), config);
        execute(&engine, cli.command)
    });

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(1)
            }
        },
        Err(e) => {
            eprintln!("{}", CliErrorPayload::from_error(&e).to_json());
            ExitCode::from(1)
        }
    }
}

/// Run one command against the engine.
fn execute(engine: &DependencyEngine, command: Commands) -> jsdepend::Result<Value> {
    match command {
        Commands::Classify { file } => {
            let dialect = engine.classify(&file)?;
            Ok(json!({ "file": file, "kind": dialect }))
        }

        Commands::Deps { file } => {
            let (refs, dialect) = engine.get_dependencies(&file)?;
            Ok(json!({ "file": file, "kind": dialect, "refs": refs }))
        }

        Commands::Graph { file } => Ok(serde_json::to_value(engine.get_dgraph(&file))?),

        Commands::Resolve {
            file,
            names,
            dialect,
        } => {
            let kind = Dialect::new(dialect);
            let refs = names
                .into_iter()
                .map(|name| Reference::new(kind.clone(), name))
                .collect();
            Ok(serde_json::to_value(engine.resolve(&file, Resolvable::Many(refs)))?)
        }
    }
}
