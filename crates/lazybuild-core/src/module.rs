//! Per-module build configuration records.

use crate::types::{
    CompilerOptions, DependencyDeclaration, PluginApplication, ProjectDependency,
    PublishingDescriptor, Repository, ShadowOptions, TaskWiring,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Path of the root module.
pub const ROOT_PATH: &str = ":";

/// Script dialect a module was declared in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dsl {
    #[default]
    Kotlin,
    Groovy,
}

/// Which modules a shared-defaults block targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedTarget {
    /// `subprojects { }`: every module except the root.
    Subprojects,
    /// `allprojects { }`: the root as well.
    Allprojects,
}

/// Configuration the root module pushes down to other modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDefaults {
    pub target: SharedTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub plugins: Vec<PluginApplication>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
    #[serde(default)]
    pub compiler: CompilerOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowOptions>,
}

impl SharedDefaults {
    pub fn new(target: SharedTarget) -> Self {
        Self {
            target,
            group: None,
            version: None,
            plugins: Vec::new(),
            repositories: Vec::new(),
            dependencies: Vec::new(),
            compiler: CompilerOptions::default(),
            shadow: None,
        }
    }

    /// Whether this block applies to the module at `path`.
    pub fn applies_to(&self, path: &str) -> bool {
        match self.target {
            SharedTarget::Allprojects => true,
            SharedTarget::Subprojects => path != ROOT_PATH,
        }
    }
}

/// One unit of the build with its own dependency set and output artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Gradle path: `:` for the root, `:library` for a subproject.
    pub path: String,
    pub name: String,
    /// Directory relative to the build root.
    pub dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_file: Option<PathBuf>,
    #[serde(default)]
    pub dsl: Dsl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub plugins: Vec<PluginApplication>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
    #[serde(default)]
    pub project_dependencies: Vec<ProjectDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing: Option<PublishingDescriptor>,
    #[serde(default)]
    pub compiler: CompilerOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowOptions>,
    #[serde(default)]
    pub tasks: Vec<TaskWiring>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// `subprojects { }` / `allprojects { }` blocks (root module only).
    #[serde(default)]
    pub shared: Vec<SharedDefaults>,
}

impl Module {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        let path = path.into();
        let dir = path_to_dir(&path);
        Self {
            path,
            name: name.into(),
            dir,
            ..Default::default()
        }
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }

    /// Applied plugin with the given id, ignoring `apply false` declarations.
    pub fn applied_plugin(&self, id: &str) -> Option<&PluginApplication> {
        self.plugins.iter().find(|p| p.apply && p.id == id)
    }
}

/// Normalises `library`, `:library` and `:a:b` into Gradle path form.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('"').trim_matches('\'');
    if trimmed.is_empty() || trimmed == ROOT_PATH {
        ROOT_PATH.to_string()
    } else if trimmed.starts_with(':') {
        trimmed.to_string()
    } else {
        format!(":{trimmed}")
    }
}

/// Directory of a module relative to the build root (`:a:b` -> `a/b`).
pub fn path_to_dir(path: &str) -> PathBuf {
    path.split(':').filter(|s| !s.is_empty()).collect()
}

/// Last segment of a module path, used as the default module name.
pub fn path_to_name(path: &str) -> &str {
    path.rsplit(':').find(|s| !s.is_empty()).unwrap_or(path)
}
