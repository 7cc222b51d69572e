//! Errors for POM rendering and reading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MavenError {
    #[error("Module '{module}' has no publishing descriptor")]
    NotPublished { module: String },

    #[error("Module '{module}' has no {what}, required for pom.xml")]
    MissingCoordinate { module: String, what: &'static str },

    #[error("Invalid pom.xml: {message}")]
    InvalidPom { message: String },

    #[error("Failed to write pom.xml: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendered pom.xml is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Core(#[from] lazybuild_core::LazybuildError),
}

pub type Result<T> = std::result::Result<T, MavenError>;

impl From<MavenError> for lazybuild_core::LazybuildError {
    fn from(err: MavenError) -> Self {
        match err {
            MavenError::NotPublished { module } => Self::MissingMetadata {
                module,
                what: "a publishing descriptor".into(),
            },
            MavenError::MissingCoordinate { module, what } => Self::MissingMetadata {
                module,
                what: what.into(),
            },
            MavenError::InvalidPom { message } => Self::ParseError {
                file_type: "pom.xml".into(),
                path: "pom.xml".into(),
                message,
            },
            MavenError::Io(source) => Self::io("pom.xml", source),
            MavenError::Utf8(e) => Self::io(
                "pom.xml",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            ),
            MavenError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazybuild_core::LazybuildError;

    #[test]
    fn test_error_display() {
        let err = MavenError::MissingCoordinate {
            module: ":library".into(),
            what: "version",
        };
        assert_eq!(
            err.to_string(),
            "Module ':library' has no version, required for pom.xml"
        );
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: LazybuildError = MavenError::NotPublished {
            module: ":library".into(),
        }
        .into();
        assert!(matches!(err, LazybuildError::MissingMetadata { ref module, .. } if module == ":library"));

        let core = LazybuildError::UnknownModule(":nope".into());
        let err: LazybuildError = MavenError::from(core).into();
        assert!(matches!(err, LazybuildError::UnknownModule(_)));
    }
}
