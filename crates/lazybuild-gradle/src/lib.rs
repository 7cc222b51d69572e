//! Gradle build support for lazybuild.
//!
//! Reads the files that describe a Gradle build into a
//! [`lazybuild_core::BuildDescriptorSet`]:
//! - `settings.gradle.kts` / `settings.gradle` (root name, included modules)
//! - `build.gradle.kts` (Kotlin DSL) and `build.gradle` (Groovy DSL)
//! - `gradle/libs.versions.toml` (Version Catalog)
//!
//! Scripts are read statically; Gradle is never executed.

pub mod conventions;
pub mod error;
pub mod loader;
pub mod parser;

pub use error::{GradleError, Result};
pub use loader::{LoaderOptions, load_build};
pub use parser::{
    GradleSettings, GroovyDslParser, KotlinDslParser, SHADOW_PLUGINS, build_script_parser,
    parse_settings, parse_version_catalog,
};
