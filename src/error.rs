//! Library error type.
//!
//! Only conditions that make the document impossible to produce are errors. Names
//! that cannot be resolved are never errors; they resolve to an unknown value.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocgenError {
    #[error("failed to parse {path} (line {line}): {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load module '{specifier}' required from {}: {reason}", importer.display())]
    ModuleLoad {
        specifier: String,
        importer: PathBuf,
        reason: String,
    },

    #[error("unsupported {shape} in {context}")]
    UnsupportedShape {
        shape: &'static str,
        context: String,
    },

    #[error("no schema declaration found (expected `new Schema({{ ... }})`)")]
    NoSchema,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = DocgenError> = std::result::Result<T, E>;
