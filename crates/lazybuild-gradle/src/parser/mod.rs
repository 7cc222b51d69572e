//! Gradle script parsers.
//!
//! Build scripts are dispatched by file name to the Kotlin or Groovy DSL
//! parser; settings scripts and the version catalog have their own entry
//! points.

pub mod blocks;
pub mod catalog;
pub mod groovy;
pub mod kotlin;
pub(crate) mod script;
pub mod settings;

use lazybuild_core::BuildScriptParser;

pub use catalog::parse_version_catalog;
pub use groovy::GroovyDslParser;
pub use kotlin::KotlinDslParser;
pub use script::SHADOW_PLUGINS;
pub use settings::{GradleSettings, parse_settings};

/// Build script parsers in lookup order.
pub const PARSERS: &[&dyn BuildScriptParser] = &[&KotlinDslParser, &GroovyDslParser];

/// Picks the build script parser for `file_name`.
pub fn build_script_parser(file_name: &str) -> Option<&'static dyn BuildScriptParser> {
    lazybuild_core::parser_for(PARSERS, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_script_parser_dispatch() {
        assert_eq!(
            build_script_parser("build.gradle.kts").map(|p| p.file_type()),
            Some("Gradle Kotlin DSL")
        );
        assert_eq!(
            build_script_parser("build.gradle").map(|p| p.file_type()),
            Some("Gradle Groovy DSL")
        );
        assert!(build_script_parser("pom.xml").is_none());
    }
}
