//! Core model for lazybuild.
//!
//! A build is described by a [`BuildDescriptorSet`]: one [`Module`] record
//! per Gradle project, plus settings-level repositories and the version
//! catalog. The [`resolver`] applies root defaults to subprojects and the
//! [`validate`] module checks structural properties of the result.

pub mod descriptor;
pub mod error;
pub mod graph;
pub mod module;
pub mod parser;
pub mod position;
pub mod resolver;
pub mod types;
pub mod validate;
pub mod version;

pub use descriptor::{BuildDescriptorSet, VersionCatalog};
pub use error::{LazybuildError, Result};
pub use module::{Dsl, Module, ROOT_PATH, SharedDefaults, SharedTarget};
pub use parser::{BuildScriptParser, parser_for};
pub use position::{LineOffsetTable, Position, Range};
pub use resolver::{EffectiveModule, ResolvedBuild, resolve};
pub use types::{
    Coordinate, CompilerOptions, DependencyDeclaration, Developer, License, PluginApplication,
    ProjectDependency, PublishingDescriptor, Relocation, Repository, Scope, ScopeFamily,
    ShadowOptions, TaskWiring,
};
pub use validate::{Severity, ValidationConfig, ValidationReport, Violation, ViolationKind, validate};
