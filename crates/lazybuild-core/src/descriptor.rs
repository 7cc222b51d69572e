//! The Build Descriptor Set: every module of one build plus build-wide
//! settings.

use crate::error::{LazybuildError, Result};
use crate::module::{Module, ROOT_PATH};
use crate::types::{Coordinate, PluginApplication, Repository};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Contents of `gradle/libs.versions.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCatalog {
    pub versions: BTreeMap<String, String>,
    pub libraries: BTreeMap<String, Coordinate>,
    pub plugins: BTreeMap<String, PluginApplication>,
}

impl VersionCatalog {
    /// Looks up a library by the accessor used in scripts (`libs.jda.emojis`
    /// -> `jda.emojis`). Catalog aliases use `-`, `_` or `.` as separators.
    pub fn library(&self, accessor: &str) -> Option<&Coordinate> {
        let wanted = normalize_alias(accessor);
        self.libraries
            .iter()
            .find(|(alias, _)| normalize_alias(alias) == wanted)
            .map(|(_, c)| c)
    }

    /// Looks up a `[versions]` entry by accessor (`libs.versions.shadow` -> `shadow`).
    pub fn version(&self, accessor: &str) -> Option<&str> {
        let wanted = normalize_alias(accessor);
        self.versions
            .iter()
            .find(|(alias, _)| normalize_alias(alias) == wanted)
            .map(|(_, v)| v.as_str())
    }

    pub fn plugin(&self, accessor: &str) -> Option<&PluginApplication> {
        let wanted = normalize_alias(accessor);
        self.plugins
            .iter()
            .find(|(alias, _)| normalize_alias(alias) == wanted)
            .map(|(_, p)| p)
    }

    /// Fills coordinates and plugin ids of every catalog-backed declaration.
    ///
    /// Unknown aliases are left untouched so validation can report them.
    pub fn resolve_aliases(&self, module: &mut Module) {
        let dependencies = module
            .dependencies
            .iter_mut()
            .chain(module.shared.iter_mut().flat_map(|s| s.dependencies.iter_mut()));
        for dep in dependencies {
            let Some(alias) = dep.catalog_alias.as_deref() else {
                continue;
            };
            match self.library(alias) {
                Some(coordinate) => dep.coordinate = coordinate.clone(),
                None => tracing::warn!("Unknown version catalog library alias '{}'", alias),
            }
        }

        let plugins = module
            .plugins
            .iter_mut()
            .chain(module.shared.iter_mut().flat_map(|s| s.plugins.iter_mut()));
        for plugin in plugins {
            if plugin.version.is_none()
                && let Some(accessor) = plugin.version_ref.as_deref()
            {
                match self.version(accessor) {
                    Some(version) => plugin.version = Some(version.to_string()),
                    None => tracing::warn!("Unknown version catalog version '{}'", accessor),
                }
            }
            let Some(alias) = plugin.catalog_alias.as_deref() else {
                continue;
            };
            match self.plugin(alias) {
                Some(entry) => {
                    plugin.id.clone_from(&entry.id);
                    if plugin.version.is_none() {
                        plugin.version.clone_from(&entry.version);
                    }
                }
                None => tracing::warn!("Unknown version catalog plugin alias '{}'", alias),
            }
        }
    }
}

fn normalize_alias(alias: &str) -> String {
    alias.replace(['-', '_'], ".").to_lowercase()
}

/// Every module of one build, keyed by Gradle path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDescriptorSet {
    pub root_dir: PathBuf,
    /// `rootProject.name`, falling back to the root directory name.
    pub root_name: String,
    pub modules: BTreeMap<String, Module>,
    /// Repositories from `dependencyResolutionManagement` in settings.
    #[serde(default)]
    pub settings_repositories: Vec<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<VersionCatalog>,
}

impl BuildDescriptorSet {
    pub fn new(root_dir: impl Into<PathBuf>, root_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            root_name: root_name.into(),
            ..Default::default()
        }
    }

    pub fn insert(&mut self, module: Module) {
        self.modules.insert(module.path.clone(), module);
    }

    pub fn root(&self) -> Option<&Module> {
        self.modules.get(ROOT_PATH)
    }

    pub fn module(&self, path: &str) -> Result<&Module> {
        self.modules
            .get(path)
            .ok_or_else(|| LazybuildError::UnknownModule(path.to_string()))
    }

    pub fn subprojects(&self) -> impl Iterator<Item = &Module> {
        self.modules.values().filter(|m| !m.is_root())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
