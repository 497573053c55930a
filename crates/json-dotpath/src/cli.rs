//! Core logic of the `json-dotpath` binary.
//!
//! ```text
//! json-dotpath get <path> [default]
//! json-dotpath set <path> <value>
//! ```
//!
//! The document is read from stdin and the result is printed as pretty JSON.
//! `default` and `value` are parsed as JSON; anything that is not valid JSON
//! is taken as a plain string, so `set name Alice` works without quoting.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::{get, set, PathError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Path(#[from] PathError),
    #[error("usage: json-dotpath get <path> [default] | json-dotpath set <path> <value>")]
    Usage,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Dispatch a command line (without the program name) against `doc_json`.
pub fn run(args: &[String], doc_json: &str) -> Result<String, CliError> {
    let (command, rest) = args.split_first().ok_or(CliError::Usage)?;
    match (command.as_str(), rest) {
        ("get", [path]) => lookup_path(doc_json, path, None),
        ("get", [path, default]) => lookup_path(doc_json, path, Some(default.as_str())),
        ("set", [path, value]) => assign_path(doc_json, path, value),
        ("get" | "set", _) => Err(CliError::Usage),
        (other, _) => Err(CliError::UnknownCommand(other.to_string())),
    }
}

/// Read `path` from a JSON document.
pub fn lookup_path(doc_json: &str, path: &str, default: Option<&str>) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let default = default.map(parse_arg).unwrap_or(Value::Null);
    debug!(path, "lookup");
    let found = get(&doc, path, &default);
    Ok(serde_json::to_string_pretty(&*found)?)
}

/// Write `value` at `path` and return the whole updated document.
pub fn assign_path(doc_json: &str, path: &str, value: &str) -> Result<String, CliError> {
    let mut doc: Value = serde_json::from_str(doc_json)?;
    debug!(path, "assign");
    set(&mut doc, path, parse_arg(value))?;
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn parse_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}
