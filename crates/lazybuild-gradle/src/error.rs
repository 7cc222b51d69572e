//! Errors specific to Gradle script handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradleError {
    #[error("Failed to parse Gradle file: {message}")]
    ParseError { message: String },

    #[error("Unbalanced '{brace}' at line {line}")]
    UnbalancedBrace { brace: char, line: usize },

    #[error("Unterminated {what} starting at line {line}")]
    Unterminated { what: &'static str, line: usize },

    #[error("Invalid version catalog: {message}")]
    Catalog { message: String },

    #[error("No Gradle build or settings script found in '{}'", dir.display())]
    NoBuildFiles { dir: PathBuf },

    #[error(transparent)]
    Core(#[from] lazybuild_core::LazybuildError),
}

pub type Result<T> = std::result::Result<T, GradleError>;

impl From<GradleError> for lazybuild_core::LazybuildError {
    fn from(err: GradleError) -> Self {
        match err {
            GradleError::Core(e) => e,
            GradleError::NoBuildFiles { dir } => Self::ParseError {
                file_type: "Gradle".into(),
                path: dir,
                message: "no build or settings script".into(),
            },
            other => Self::ParseError {
                file_type: "Gradle".into(),
                path: PathBuf::new(),
                message: other.to_string(),
            },
        }
    }
}

impl GradleError {
    /// Attaches the script path to a scan or parse failure.
    pub fn at(self, file_type: &str, path: impl Into<PathBuf>) -> lazybuild_core::LazybuildError {
        match self {
            Self::Core(e) => e,
            other => lazybuild_core::LazybuildError::ParseError {
                file_type: file_type.to_string(),
                path: path.into(),
                message: other.to_string(),
            },
        }
    }
}
