//! Core error types for lazybuild.

use std::path::PathBuf;
use thiserror::Error;

/// Errors shared by every lazybuild crate.
///
/// Format-specific crates define their own error enums and convert into this
/// one at their public boundary.
#[derive(Error, Debug)]
pub enum LazybuildError {
    #[error("Failed to parse {file_type} file '{}': {message}", path.display())]
    ParseError {
        file_type: String,
        path: PathBuf,
        message: String,
    },

    #[error("Module '{0}' is not part of the build")]
    UnknownModule(String),

    #[error(
        "Scope conflict in module '{module}': '{coordinate}' is declared as both {first} and {second}"
    )]
    ScopeConflict {
        module: String,
        coordinate: String,
        first: String,
        second: String,
    },

    #[error("Module '{module}' is missing {what}")]
    MissingMetadata { module: String, what: String },

    #[error("File '{}' is too large: {size} bytes (max: {max} bytes)", path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LazybuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LazybuildError>;
