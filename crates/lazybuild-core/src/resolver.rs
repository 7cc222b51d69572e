//! Applies root defaults to every module of a Build Descriptor Set.
//!
//! The result is the effective, fully merged configuration of each module.
//! Output ordering is deterministic, so resolving the same descriptor set twice
//! yields identical graphs.

use crate::descriptor::BuildDescriptorSet;
use crate::error::{LazybuildError, Result};
use crate::module::{Module, SharedDefaults};
use crate::types::{
    CompilerOptions, DependencyDeclaration, PluginApplication, ProjectDependency,
    PublishingDescriptor, Repository, Scope, ScopeFamily, ShadowOptions, TaskWiring,
};
use crate::version::max_version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

/// A module after root defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveModule {
    pub path: String,
    pub name: String,
    pub dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub plugins: Vec<PluginApplication>,
    pub repositories: Vec<Repository>,
    /// Sorted by scope, then coordinate.
    pub dependencies: Vec<DependencyDeclaration>,
    pub project_dependencies: Vec<ProjectDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing: Option<PublishingDescriptor>,
    pub compiler: CompilerOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowOptions>,
    pub tasks: Vec<TaskWiring>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
}

impl EffectiveModule {
    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.iter().any(|p| p.id == id)
    }

    /// Dependencies visible to consumers of this module.
    pub fn exported_dependencies(&self) -> impl Iterator<Item = &DependencyDeclaration> {
        self.dependencies.iter().filter(|d| d.scope.is_exported())
    }
}

/// The resolved module graph of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBuild {
    pub root_name: String,
    pub modules: BTreeMap<String, EffectiveModule>,
}

impl ResolvedBuild {
    pub fn module(&self, path: &str) -> Result<&EffectiveModule> {
        self.modules
            .get(path)
            .ok_or_else(|| LazybuildError::UnknownModule(path.to_string()))
    }
}

/// Resolves every module of `set`.
///
/// # Errors
///
/// Returns `LazybuildError::ScopeConflict` when a module's effective
/// dependency set declares the same coordinate in two scopes.
pub fn resolve(set: &BuildDescriptorSet) -> Result<ResolvedBuild> {
    let mut modules = BTreeMap::new();
    for module in set.modules.values() {
        let effective = resolve_module(set, module)?;
        modules.insert(effective.path.clone(), effective);
    }
    Ok(ResolvedBuild {
        root_name: set.root_name.clone(),
        modules,
    })
}

/// Resolves a single module of `set`.
pub fn resolve_module(set: &BuildDescriptorSet, module: &Module) -> Result<EffectiveModule> {
    tracing::debug!("Resolving module {}", module.path);
    let shared = shared_defaults_for(set, &module.path);

    let group = module
        .group
        .clone()
        .or_else(|| shared.iter().find_map(|s| s.group.clone()));
    let version = module
        .version
        .clone()
        .or_else(|| shared.iter().find_map(|s| s.version.clone()));

    let compiler = shared
        .iter()
        .fold(module.compiler.clone(), |acc, s| acc.or(&s.compiler));
    let shadow = module
        .shadow
        .clone()
        .or_else(|| shared.iter().find_map(|s| s.shadow.clone()));

    let publishing = module.publishing.clone().map(|mut p| {
        if p.artifact_id.is_none() {
            p.artifact_id = Some(module.name.clone());
        }
        if p.group_id.is_none() {
            p.group_id.clone_from(&group);
        }
        p
    });

    let mut project_dependencies = module.project_dependencies.clone();
    project_dependencies.sort_by(|a, b| (a.scope, &a.path).cmp(&(b.scope, &b.path)));

    Ok(EffectiveModule {
        path: module.path.clone(),
        name: module.name.clone(),
        dir: module.dir.clone(),
        group,
        version,
        description: module.description.clone(),
        plugins: effective_plugins(set, module, &shared),
        repositories: effective_repositories(set, module, &shared),
        dependencies: effective_dependencies(module, &shared)?,
        project_dependencies,
        publishing,
        compiler,
        shadow,
        tasks: module.tasks.clone(),
        main_class: module.main_class.clone(),
    })
}

/// Shared-defaults blocks of the root that apply to `path`.
pub fn shared_defaults_for<'a>(set: &'a BuildDescriptorSet, path: &str) -> Vec<&'a SharedDefaults> {
    set.root()
        .map(|root| root.shared.iter().filter(|s| s.applies_to(path)).collect())
        .unwrap_or_default()
}

/// Versions pinned anywhere at the root: `plugins { id(..) version ".." apply false }`
/// and catalog plugin aliases.
fn pinned_plugin_versions(set: &BuildDescriptorSet) -> BTreeMap<&str, &str> {
    let mut pinned = BTreeMap::new();
    if let Some(catalog) = &set.catalog {
        for plugin in catalog.plugins.values() {
            if let Some(v) = &plugin.version {
                pinned.insert(plugin.id.as_str(), v.as_str());
            }
        }
    }
    if let Some(root) = set.root() {
        for plugin in &root.plugins {
            if let Some(v) = &plugin.version {
                pinned.insert(plugin.id.as_str(), v.as_str());
            }
        }
    }
    pinned
}

fn effective_plugins(
    set: &BuildDescriptorSet,
    module: &Module,
    shared: &[&SharedDefaults],
) -> Vec<PluginApplication> {
    let pinned = pinned_plugin_versions(set);
    let mut plugins: Vec<PluginApplication> = Vec::new();

    let candidates = shared
        .iter()
        .flat_map(|s| s.plugins.iter())
        .chain(module.plugins.iter());
    for plugin in candidates {
        if !plugin.apply {
            continue;
        }
        if plugin.id.is_empty() {
            tracing::debug!(
                "Module {}: skipping unresolved plugin alias {:?}",
                module.path,
                plugin.catalog_alias
            );
            continue;
        }
        let mut plugin = plugin.clone();
        if plugin.version.is_none() && !plugin.is_core() {
            plugin.version = pinned.get(plugin.id.as_str()).map(|v| (*v).to_string());
        }
        // the module's own declaration comes last and wins
        match plugins.iter_mut().find(|p| p.id == plugin.id) {
            Some(existing) => {
                if plugin.version.is_some() {
                    *existing = plugin;
                }
            }
            None => plugins.push(plugin),
        }
    }
    plugins
}

fn effective_repositories(
    set: &BuildDescriptorSet,
    module: &Module,
    shared: &[&SharedDefaults],
) -> Vec<Repository> {
    let mut repositories: Vec<Repository> = Vec::new();
    let candidates = set
        .settings_repositories
        .iter()
        .chain(shared.iter().flat_map(|s| s.repositories.iter()))
        .chain(module.repositories.iter());
    for repo in candidates {
        if !repositories.iter().any(|r| r.url == repo.url) {
            repositories.push(repo.clone());
        }
    }
    repositories
}

fn effective_dependencies(
    module: &Module,
    shared: &[&SharedDefaults],
) -> Result<Vec<DependencyDeclaration>> {
    let mut by_key: BTreeMap<(ScopeFamily, String), DependencyDeclaration> = BTreeMap::new();
    // unresolved catalog aliases have no coordinate to merge on
    let mut incomplete: Vec<DependencyDeclaration> = Vec::new();

    let candidates = shared
        .iter()
        .flat_map(|s| s.dependencies.iter())
        .chain(module.dependencies.iter());
    for dep in candidates {
        if !dep.coordinate.is_complete() {
            incomplete.push(dep.clone());
            continue;
        }
        match by_key.entry((dep.scope.family(), dep.coordinate.key())) {
            Entry::Vacant(slot) => {
                slot.insert(dep.clone());
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.scope != dep.scope {
                    return Err(scope_conflict(module, existing.scope, dep));
                }
                let chosen = match (&existing.coordinate.version, &dep.coordinate.version) {
                    (Some(a), Some(b)) => Some(max_version(a, b).to_string()),
                    (a, b) => a.clone().or_else(|| b.clone()),
                };
                tracing::debug!(
                    "Module {}: '{}' declared twice as {}, keeping version {:?}",
                    module.path,
                    dep.coordinate.key(),
                    dep.scope,
                    chosen
                );
                if chosen != existing.coordinate.version {
                    *existing = dep.clone();
                }
            }
        }
    }

    let mut dependencies: Vec<DependencyDeclaration> = by_key.into_values().collect();
    dependencies.extend(incomplete);
    dependencies.sort_by(|a, b| {
        (a.scope, &a.coordinate, &a.catalog_alias).cmp(&(b.scope, &b.coordinate, &b.catalog_alias))
    });
    Ok(dependencies)
}

fn scope_conflict(module: &Module, first: Scope, dep: &DependencyDeclaration) -> LazybuildError {
    LazybuildError::ScopeConflict {
        module: module.path.clone(),
        coordinate: dep.coordinate.key(),
        first: first.to_string(),
        second: dep.scope.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ROOT_PATH, SharedTarget};
    use crate::types::Coordinate;

    fn dep(scope: Scope, notation: &str) -> DependencyDeclaration {
        DependencyDeclaration::new(scope, Coordinate::parse(notation).unwrap())
    }

    fn sample_set() -> BuildDescriptorSet {
        let mut set = BuildDescriptorSet::new("/work/lazy-library", "lazy-library");
        set.settings_repositories.push(Repository::maven_central());

        let mut root = Module::new(ROOT_PATH, "lazy-library");
        root.plugins.push(PluginApplication::new("java-library"));
        let mut shadow = PluginApplication::new("com.gradleup.shadow").with_version("8.3.8");
        shadow.apply = false;
        root.plugins.push(shadow);

        let mut shared = SharedDefaults::new(SharedTarget::Subprojects);
        shared.group = Some("xyz.srnyx".into());
        shared.plugins.push(PluginApplication::new("com.gradleup.shadow"));
        shared.repositories.push(Repository::jitpack());
        shared.repositories.push(Repository::maven_central());
        shared.compiler.java_version = Some("17".into());
        shared.shadow = Some(ShadowOptions {
            merge_service_files: true,
            ..Default::default()
        });
        shared
            .dependencies
            .push(dep(Scope::Implementation, "ch.qos.logback:logback-classic:1.5.18"));
        root.shared.push(shared);
        set.insert(root);

        let mut library = Module::new(":library", "library");
        library.version = Some("3.2.0".into());
        library.compiler.java_version = Some("22".into());
        library.dependencies.push(dep(Scope::Api, "io.github.freya022:BotCommands:3.0.0-beta.3"));
        library.dependencies.push(dep(Scope::RuntimeOnly, "org.postgresql:postgresql:42.7.7"));
        library.publishing = Some(PublishingDescriptor {
            publication: "maven".into(),
            ..Default::default()
        });
        set.insert(library);
        set
    }

    #[test]
    fn test_subproject_inherits_shared_defaults() {
        let resolved = resolve(&sample_set()).unwrap();
        let library = resolved.module(":library").unwrap();

        assert_eq!(library.group.as_deref(), Some("xyz.srnyx"));
        assert_eq!(library.version.as_deref(), Some("3.2.0"));
        assert_eq!(library.compiler.java_version.as_deref(), Some("22"));
        assert!(library.shadow.as_ref().unwrap().merge_service_files);

        let shadow = library
            .plugins
            .iter()
            .find(|p| p.id == "com.gradleup.shadow")
            .unwrap();
        assert_eq!(shadow.version.as_deref(), Some("8.3.8"));
    }

    #[test]
    fn test_root_is_not_a_subproject() {
        let resolved = resolve(&sample_set()).unwrap();
        let root = resolved.module(ROOT_PATH).unwrap();
        assert!(root.group.is_none());
        assert!(root.dependencies.is_empty());
        // apply false declarations are not applications
        assert!(!root.has_plugin("com.gradleup.shadow"));
        assert!(root.has_plugin("java-library"));
    }

    #[test]
    fn test_dependency_union_is_sorted() {
        let resolved = resolve(&sample_set()).unwrap();
        let library = resolved.module(":library").unwrap();
        let names: Vec<String> = library
            .dependencies
            .iter()
            .map(|d| format!("{} {}", d.scope, d.coordinate.key()))
            .collect();
        assert_eq!(
            names,
            vec![
                "api io.github.freya022:BotCommands",
                "implementation ch.qos.logback:logback-classic",
                "runtimeOnly org.postgresql:postgresql",
            ]
        );
        assert_eq!(library.exported_dependencies().count(), 1);
    }

    #[test]
    fn test_repositories_deduplicated_in_order() {
        let resolved = resolve(&sample_set()).unwrap();
        let library = resolved.module(":library").unwrap();
        let names: Vec<&str> = library.repositories.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["MavenCentral", "JitPack"]);
    }

    #[test]
    fn test_publishing_defaults() {
        let resolved = resolve(&sample_set()).unwrap();
        let publishing = resolved
            .module(":library")
            .unwrap()
            .publishing
            .clone()
            .unwrap();
        assert_eq!(publishing.artifact_id.as_deref(), Some("library"));
        assert_eq!(publishing.group_id.as_deref(), Some("xyz.srnyx"));
    }

    #[test]
    fn test_scope_conflict_is_an_error() {
        let mut set = sample_set();
        let library = set.modules.get_mut(":library").unwrap();
        library
            .dependencies
            .push(dep(Scope::Api, "ch.qos.logback:logback-classic:1.5.18"));

        let err = resolve(&set).unwrap_err();
        match err {
            LazybuildError::ScopeConflict {
                module,
                coordinate,
                first,
                second,
            } => {
                assert_eq!(module, ":library");
                assert_eq!(coordinate, "ch.qos.logback:logback-classic");
                assert_eq!(first, "implementation");
                assert_eq!(second, "api");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_scope_keeps_highest_version() {
        let mut set = sample_set();
        let library = set.modules.get_mut(":library").unwrap();
        library
            .dependencies
            .push(dep(Scope::Implementation, "ch.qos.logback:logback-classic:1.4.7"));
        library
            .dependencies
            .push(dep(Scope::RuntimeOnly, "org.postgresql:postgresql:42.7.8"));

        let resolved = resolve(&set).unwrap();
        let library = resolved.module(":library").unwrap();
        let version_of = |artifact: &str| {
            library
                .dependencies
                .iter()
                .find(|d| d.coordinate.artifact == artifact)
                .and_then(|d| d.coordinate.version.clone())
        };
        assert_eq!(version_of("logback-classic").as_deref(), Some("1.5.18"));
        assert_eq!(version_of("postgresql").as_deref(), Some("42.7.8"));
    }

    #[test]
    fn test_annotation_processor_and_test_scopes_do_not_conflict() {
        let mut set = BuildDescriptorSet::new("/work/bot", "bot");
        let mut root = Module::new(ROOT_PATH, "bot");
        root.dependencies
            .push(dep(Scope::CompileOnly, "org.projectlombok:lombok:1.18.30"));
        root.dependencies
            .push(dep(Scope::AnnotationProcessor, "org.projectlombok:lombok:1.18.30"));
        root.dependencies.push(dep(Scope::Implementation, "net.dv8tion:JDA:5.6.1"));
        root.dependencies
            .push(dep(Scope::TestImplementation, "net.dv8tion:JDA:5.6.1"));
        set.insert(root);

        let resolved = resolve(&set).unwrap();
        let names: Vec<String> = resolved
            .module(ROOT_PATH)
            .unwrap()
            .dependencies
            .iter()
            .map(|d| format!("{} {}", d.scope, d.coordinate.key()))
            .collect();
        assert_eq!(
            names,
            vec![
                "implementation net.dv8tion:JDA",
                "compileOnly org.projectlombok:lombok",
                "testImplementation net.dv8tion:JDA",
                "annotationProcessor org.projectlombok:lombok",
            ]
        );
    }

    #[test]
    fn test_test_scopes_still_conflict_with_each_other() {
        let mut set = BuildDescriptorSet::new("/work/bot", "bot");
        let mut root = Module::new(ROOT_PATH, "bot");
        root.dependencies
            .push(dep(Scope::TestImplementation, "org.junit.jupiter:junit-jupiter:5.10.0"));
        root.dependencies
            .push(dep(Scope::TestRuntimeOnly, "org.junit.jupiter:junit-jupiter:5.10.0"));
        set.insert(root);

        assert!(matches!(
            resolve(&set),
            Err(LazybuildError::ScopeConflict { .. })
        ));
    }

    #[test]
    fn test_unresolved_aliases_are_kept_apart() {
        let mut set = BuildDescriptorSet::new("/work/bot", "bot");
        let mut root = Module::new(ROOT_PATH, "bot");
        for (scope, alias) in [
            (Scope::Api, "foo"),
            (Scope::Implementation, "bar"),
            (Scope::Api, "baz"),
        ] {
            let mut unresolved = DependencyDeclaration::new(scope, Coordinate::default());
            unresolved.catalog_alias = Some(alias.into());
            root.dependencies.push(unresolved);
        }
        let mut alias_plugin = PluginApplication::new("");
        alias_plugin.catalog_alias = Some("shadow".into());
        root.plugins.push(alias_plugin);
        set.insert(root);

        let resolved = resolve(&set).unwrap();
        let root = resolved.module(ROOT_PATH).unwrap();
        let aliases: Vec<&str> = root
            .dependencies
            .iter()
            .filter_map(|d| d.catalog_alias.as_deref())
            .collect();
        assert_eq!(aliases, vec!["baz", "foo", "bar"]);
        assert!(root.plugins.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let set = sample_set();
        let first = resolve(&set).unwrap();
        let second = resolve(&set).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_single_module_build() {
        let mut set = BuildDescriptorSet::new("/work/bot", "bot");
        let mut root = Module::new(ROOT_PATH, "bot");
        root.dependencies.push(dep(Scope::Api, "net.dv8tion:JDA:5.6.1"));
        set.insert(root);

        let resolved = resolve(&set).unwrap();
        assert_eq!(resolved.modules.len(), 1);
        assert_eq!(resolved.module(ROOT_PATH).unwrap().dependencies.len(), 1);
    }
}
