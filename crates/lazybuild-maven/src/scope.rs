//! Gradle configuration to Maven scope mapping.

use lazybuild_core::Scope;
use std::fmt;

/// Dependency scopes written to a published POM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MavenScope {
    Compile,
    Runtime,
}

impl MavenScope {
    /// Maven scope a Gradle configuration is published under.
    ///
    /// Compile-only, test and annotation-processor configurations are not
    /// part of the published POM.
    pub const fn from_gradle(scope: Scope) -> Option<Self> {
        match scope {
            Scope::Api => Some(Self::Compile),
            Scope::Implementation | Scope::RuntimeOnly => Some(Self::Runtime),
            _ => None,
        }
    }

    /// Parses a POM `<scope>` value; a missing scope means `compile`.
    pub fn parse(scope: Option<&str>) -> Option<Self> {
        match scope.map(str::trim) {
            None | Some("" | "compile") => Some(Self::Compile),
            Some("runtime") => Some(Self::Runtime),
            Some(_) => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
        }
    }
}

impl fmt::Display for MavenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
