//! Maven POM support for lazybuild.
//!
//! Renders the `pom.xml` a published module ships with, mapping Gradle
//! configurations onto Maven scopes, and reads dependency lists back out of
//! existing POMs.

pub mod error;
pub mod pom;
pub mod reader;
pub mod scope;

pub use error::{MavenError, Result};
pub use pom::{PomDependency, published_dependencies, render_pom};
pub use reader::read_dependencies;
pub use scope::MavenScope;
