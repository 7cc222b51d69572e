//! Structural checks over a Build Descriptor Set.

use crate::descriptor::BuildDescriptorSet;
use crate::graph::find_cycle;
use crate::module::Module;
use crate::resolver::shared_defaults_for;
use crate::types::{DependencyDeclaration, ScopeFamily};
use crate::version::is_prerelease;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Switches for optional checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accept `-SNAPSHOT`, `-beta` and similar dependency versions silently.
    pub allow_prerelease: bool,
    /// Treat warnings as errors when computing [`ValidationReport::passed`].
    pub deny_warnings: bool,
    /// Report dependencies without a version as errors.
    pub require_versions: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_prerelease: false,
            deny_warnings: false,
            require_versions: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViolationKind {
    EmptyCoordinateField { dependency: String, field: String },
    UnresolvedCatalogAlias { alias: String },
    PublishingWithoutLicense,
    PublishingWithoutDeveloper,
    ScopeConflict { coordinate: String, scopes: Vec<String> },
    UnknownProjectDependency { target: String },
    ModuleCycle { cycle: Vec<String> },
    TaskCycle { cycle: Vec<String> },
    PluginWithoutVersion { plugin: String },
    PrereleaseDependency { dependency: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCoordinateField { dependency, field } => {
                write!(f, "dependency '{dependency}' has an empty {field}")
            }
            Self::UnresolvedCatalogAlias { alias } => {
                write!(f, "version catalog alias 'libs.{alias}' does not exist")
            }
            Self::PublishingWithoutLicense => f.write_str("publishing descriptor lists no license"),
            Self::PublishingWithoutDeveloper => {
                f.write_str("publishing descriptor lists no developer")
            }
            Self::ScopeConflict { coordinate, scopes } => {
                write!(f, "'{coordinate}' is declared in several scopes: {}", scopes.join(", "))
            }
            Self::UnknownProjectDependency { target } => {
                write!(f, "depends on unknown module '{target}'")
            }
            Self::ModuleCycle { cycle } => {
                write!(f, "module dependency cycle: {}", cycle.join(" -> "))
            }
            Self::TaskCycle { cycle } => write!(f, "task dependency cycle: {}", cycle.join(" -> ")),
            Self::PluginWithoutVersion { plugin } => {
                write!(f, "plugin '{plugin}' has no resolvable version")
            }
            Self::PrereleaseDependency { dependency } => {
                write!(f, "dependency '{dependency}' uses a pre-release version")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub module: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{label}[{}]: {}", self.module, self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    #[serde(skip)]
    deny_warnings: bool,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    pub fn passed(&self) -> bool {
        if self.deny_warnings {
            self.violations.is_empty()
        } else {
            self.errors().next().is_none()
        }
    }

    fn push(&mut self, module: &Module, severity: Severity, kind: ViolationKind) {
        self.violations.push(Violation {
            module: module.path.clone(),
            severity,
            kind,
        });
    }
}

/// Runs every structural check over `set`.
pub fn validate(set: &BuildDescriptorSet, config: &ValidationConfig) -> ValidationReport {
    let mut report = ValidationReport {
        violations: Vec::new(),
        deny_warnings: config.deny_warnings,
    };

    for module in set.modules.values() {
        let shared = shared_defaults_for(set, &module.path);
        let declared: Vec<&DependencyDeclaration> = shared
            .iter()
            .flat_map(|s| s.dependencies.iter())
            .chain(module.dependencies.iter())
            .collect();

        check_coordinates(&mut report, module, &declared, config);
        check_scope_conflicts(&mut report, module, &declared);
        check_publishing(&mut report, module);
        check_project_dependencies(&mut report, set, module);
        check_tasks(&mut report, module);
        check_plugin_versions(&mut report, set, module);
    }
    check_module_cycles(&mut report, set);

    tracing::debug!(
        "Validated {} modules: {} errors, {} warnings",
        set.modules.len(),
        report.errors().count(),
        report.warnings().count()
    );
    report
}

fn check_coordinates(
    report: &mut ValidationReport,
    module: &Module,
    declared: &[&DependencyDeclaration],
    config: &ValidationConfig,
) {
    for dep in declared {
        let coordinate = &dep.coordinate;
        if (coordinate.group.is_empty() || coordinate.artifact.is_empty())
            && let Some(alias) = &dep.catalog_alias
        {
            report.push(
                module,
                Severity::Error,
                ViolationKind::UnresolvedCatalogAlias {
                    alias: alias.clone(),
                },
            );
            continue;
        }

        let label = coordinate.key();
        for (field, empty) in [
            ("groupId", coordinate.group.is_empty()),
            ("artifactId", coordinate.artifact.is_empty()),
        ] {
            if empty {
                report.push(
                    module,
                    Severity::Error,
                    ViolationKind::EmptyCoordinateField {
                        dependency: label.clone(),
                        field: field.to_string(),
                    },
                );
            }
        }

        match coordinate.version.as_deref() {
            None | Some("") if config.require_versions && !dep.platform => {
                report.push(
                    module,
                    Severity::Error,
                    ViolationKind::EmptyCoordinateField {
                        dependency: label,
                        field: "version".to_string(),
                    },
                );
            }
            Some(v) if !config.allow_prerelease && is_prerelease(v) => {
                report.push(
                    module,
                    Severity::Warning,
                    ViolationKind::PrereleaseDependency {
                        dependency: coordinate.to_string(),
                    },
                );
            }
            _ => {}
        }
    }
}

fn check_scope_conflicts(
    report: &mut ValidationReport,
    module: &Module,
    declared: &[&DependencyDeclaration],
) {
    let mut scopes: BTreeMap<(ScopeFamily, String), Vec<String>> = BTreeMap::new();
    for dep in declared {
        if !dep.coordinate.is_complete() {
            continue;
        }
        let entry = scopes
            .entry((dep.scope.family(), dep.coordinate.key()))
            .or_default();
        let scope = dep.scope.to_string();
        if !entry.contains(&scope) {
            entry.push(scope);
        }
    }
    for ((_, coordinate), scopes) in scopes {
        if scopes.len() > 1 {
            report.push(
                module,
                Severity::Error,
                ViolationKind::ScopeConflict { coordinate, scopes },
            );
        }
    }
}

fn check_publishing(report: &mut ValidationReport, module: &Module) {
    let Some(publishing) = &module.publishing else {
        return;
    };
    if publishing.licenses.is_empty() {
        report.push(module, Severity::Error, ViolationKind::PublishingWithoutLicense);
    }
    if publishing.developers.is_empty() {
        report.push(
            module,
            Severity::Error,
            ViolationKind::PublishingWithoutDeveloper,
        );
    }
}

fn check_project_dependencies(report: &mut ValidationReport, set: &BuildDescriptorSet, module: &Module) {
    for dep in &module.project_dependencies {
        if !set.modules.contains_key(&dep.path) {
            report.push(
                module,
                Severity::Error,
                ViolationKind::UnknownProjectDependency {
                    target: dep.path.clone(),
                },
            );
        }
    }
}

fn check_module_cycles(report: &mut ValidationReport, set: &BuildDescriptorSet) {
    let edges: BTreeMap<String, Vec<String>> = set
        .modules
        .values()
        .map(|m| {
            let targets = m.project_dependencies.iter().map(|d| d.path.clone()).collect();
            (m.path.clone(), targets)
        })
        .collect();
    if let Some(cycle) = find_cycle(&edges)
        && let Some(module) = set.modules.get(&cycle[0])
    {
        report.push(module, Severity::Error, ViolationKind::ModuleCycle { cycle });
    }
}

fn check_tasks(report: &mut ValidationReport, module: &Module) {
    let mut edges: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for wiring in &module.tasks {
        edges
            .entry(wiring.task.clone())
            .or_default()
            .extend(wiring.depends_on.iter().cloned());
    }
    if let Some(cycle) = find_cycle(&edges) {
        report.push(module, Severity::Error, ViolationKind::TaskCycle { cycle });
    }
}

fn check_plugin_versions(report: &mut ValidationReport, set: &BuildDescriptorSet, module: &Module) {
    let mut pinned: HashSet<&str> = HashSet::new();
    let root_plugins = set.root().map(|r| r.plugins.as_slice()).unwrap_or_default();
    let catalog_plugins = set.catalog.iter().flat_map(|c| c.plugins.values());
    for plugin in root_plugins.iter().chain(catalog_plugins) {
        if plugin.version.is_some() {
            pinned.insert(plugin.id.as_str());
        }
    }

    let shared_plugins = module.shared.iter().flat_map(|s| s.plugins.iter());
    for plugin in module.plugins.iter().chain(shared_plugins) {
        if plugin.id.is_empty() {
            if let Some(alias) = &plugin.catalog_alias {
                report.push(
                    module,
                    Severity::Error,
                    ViolationKind::UnresolvedCatalogAlias {
                        alias: format!("plugins.{alias}"),
                    },
                );
            }
            continue;
        }
        if plugin.is_core() || plugin.version.is_some() {
            continue;
        }
        if let Some(accessor) = &plugin.version_ref {
            report.push(
                module,
                Severity::Error,
                ViolationKind::UnresolvedCatalogAlias {
                    alias: format!("versions.{accessor}"),
                },
            );
            continue;
        }
        if !pinned.contains(plugin.id.as_str()) {
            report.push(
                module,
                Severity::Warning,
                ViolationKind::PluginWithoutVersion {
                    plugin: plugin.id.clone(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ROOT_PATH, SharedDefaults, SharedTarget};
    use crate::types::{
        Coordinate, Developer, License, PluginApplication, ProjectDependency,
        PublishingDescriptor, Scope, TaskWiring,
    };

    fn dep(scope: Scope, notation: &str) -> DependencyDeclaration {
        DependencyDeclaration::new(scope, Coordinate::parse(notation).unwrap())
    }

    fn valid_set() -> BuildDescriptorSet {
        let mut set = BuildDescriptorSet::new("/work/lazy-library", "lazy-library");
        let mut root = Module::new(ROOT_PATH, "lazy-library");
        root.plugins
            .push(PluginApplication::new("com.gradleup.shadow").with_version("8.3.8"));
        root.dependencies.push(dep(Scope::Api, "net.dv8tion:JDA:5.6.1"));
        root.publishing = Some(PublishingDescriptor {
            publication: "maven".into(),
            artifact_id: Some("lazy-library".into()),
            url: Some("https://lazy-library.srnyx.com".into()),
            licenses: vec![License {
                name: "MIT License".into(),
                url: None,
            }],
            developers: vec![Developer::new("srnyx")],
            ..Default::default()
        });
        root.tasks.push(TaskWiring {
            task: "startScripts".into(),
            depends_on: vec!["shadowJar".into()],
        });
        set.insert(root);
        set
    }

    fn kinds(report: &ValidationReport) -> Vec<&ViolationKind> {
        report.violations.iter().map(|v| &v.kind).collect()
    }

    #[test]
    fn test_valid_set_passes() {
        let report = validate(&valid_set(), &ValidationConfig::default());
        assert!(report.violations.is_empty(), "{:?}", report.violations);
        assert!(report.passed());
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        root.dependencies.push(dep(Scope::Implementation, "com.zaxxer:HikariCP"));

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![&ViolationKind::EmptyCoordinateField {
                dependency: "com.zaxxer:HikariCP".into(),
                field: "version".into(),
            }]
        );
        assert!(!report.passed());

        let relaxed = ValidationConfig {
            require_versions: false,
            ..Default::default()
        };
        assert!(validate(&set, &relaxed).passed());
    }

    #[test]
    fn test_platform_without_version_is_accepted() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        let mut bom = dep(Scope::Implementation, "org.jetbrains.kotlin:kotlin-bom");
        bom.platform = true;
        root.dependencies.push(bom);
        assert!(validate(&set, &ValidationConfig::default()).violations.is_empty());
    }

    #[test]
    fn test_unresolved_catalog_alias() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        let mut unresolved = DependencyDeclaration::new(Scope::Api, Coordinate::default());
        unresolved.catalog_alias = Some("jda.emojis".into());
        root.dependencies.push(unresolved);

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![&ViolationKind::UnresolvedCatalogAlias {
                alias: "jda.emojis".into()
            }]
        );
    }

    #[test]
    fn test_prerelease_warning() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        root.dependencies
            .push(dep(Scope::Api, "io.github.freya022:BotCommands:3.0.0-beta.3"));

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(report.warnings().count(), 1);
        assert!(report.passed());

        let strict = ValidationConfig {
            deny_warnings: true,
            ..Default::default()
        };
        assert!(!validate(&set, &strict).passed());

        let lenient = ValidationConfig {
            allow_prerelease: true,
            ..Default::default()
        };
        assert!(validate(&set, &lenient).violations.is_empty());
    }

    #[test]
    fn test_publishing_requires_license_and_developer() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        let publishing = root.publishing.as_mut().unwrap();
        publishing.licenses.clear();
        publishing.developers.clear();

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![
                &ViolationKind::PublishingWithoutLicense,
                &ViolationKind::PublishingWithoutDeveloper
            ]
        );
    }

    #[test]
    fn test_scope_conflict_across_shared_defaults() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        let mut shared = SharedDefaults::new(SharedTarget::Subprojects);
        shared
            .dependencies
            .push(dep(Scope::Implementation, "org.postgresql:postgresql:42.7.7"));
        root.shared.push(shared);

        let mut library = Module::new(":library", "library");
        library
            .dependencies
            .push(dep(Scope::RuntimeOnly, "org.postgresql:postgresql:42.7.7"));
        set.insert(library);

        let report = validate(&set, &ValidationConfig::default());
        let conflict = report
            .violations
            .iter()
            .find(|v| matches!(v.kind, ViolationKind::ScopeConflict { .. }))
            .unwrap();
        assert_eq!(conflict.module, ":library");
        assert_eq!(
            conflict.kind,
            ViolationKind::ScopeConflict {
                coordinate: "org.postgresql:postgresql".into(),
                scopes: vec!["implementation".into(), "runtimeOnly".into()],
            }
        );
    }

    #[test]
    fn test_annotation_processor_is_not_a_scope_conflict() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        root.dependencies
            .push(dep(Scope::CompileOnly, "org.projectlombok:lombok:1.18.30"));
        root.dependencies
            .push(dep(Scope::AnnotationProcessor, "org.projectlombok:lombok:1.18.30"));
        root.dependencies
            .push(dep(Scope::TestImplementation, "net.dv8tion:JDA:5.6.1"));

        let report = validate(&set, &ValidationConfig::default());
        assert!(report.violations.is_empty(), "{:?}", report.violations);
    }

    #[test]
    fn test_unresolved_plugin_alias() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        let mut shadow = PluginApplication::new("");
        shadow.catalog_alias = Some("shadow".into());
        root.plugins.push(shadow);

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![&ViolationKind::UnresolvedCatalogAlias {
                alias: "plugins.shadow".into()
            }]
        );
        assert!(!report.passed());
    }

    #[test]
    fn test_unresolved_plugin_version_ref() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        let mut kotlin = PluginApplication::new("org.jetbrains.kotlin.jvm");
        kotlin.version_ref = Some("kotlin".into());
        root.plugins.push(kotlin);

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![&ViolationKind::UnresolvedCatalogAlias {
                alias: "versions.kotlin".into()
            }]
        );
    }

    #[test]
    fn test_unknown_project_dependency_and_cycle() {
        let mut set = valid_set();
        let mut a = Module::new(":a", "a");
        a.project_dependencies.push(ProjectDependency {
            scope: Scope::Api,
            path: ":b".into(),
            range: Default::default(),
        });
        let mut b = Module::new(":b", "b");
        b.project_dependencies.push(ProjectDependency {
            scope: Scope::Implementation,
            path: ":a".into(),
            range: Default::default(),
        });
        b.project_dependencies.push(ProjectDependency {
            scope: Scope::Implementation,
            path: ":missing".into(),
            range: Default::default(),
        });
        set.insert(a);
        set.insert(b);

        let report = validate(&set, &ValidationConfig::default());
        assert!(kinds(&report).contains(&&ViolationKind::UnknownProjectDependency {
            target: ":missing".into()
        }));
        assert!(kinds(&report).contains(&&ViolationKind::ModuleCycle {
            cycle: vec![":a".into(), ":b".into(), ":a".into()]
        }));
    }

    #[test]
    fn test_task_cycle() {
        let mut set = valid_set();
        let root = set.modules.get_mut(ROOT_PATH).unwrap();
        root.tasks.push(TaskWiring {
            task: "shadowJar".into(),
            depends_on: vec!["startScripts".into()],
        });

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![&ViolationKind::TaskCycle {
                cycle: vec![
                    "shadowJar".into(),
                    "startScripts".into(),
                    "shadowJar".into()
                ]
            }]
        );
    }

    #[test]
    fn test_plugin_without_version_warning() {
        let mut set = valid_set();
        let mut library = Module::new(":library", "library");
        library.plugins.push(PluginApplication::new("com.gradleup.shadow"));
        library
            .plugins
            .push(PluginApplication::new("dev.reformator.stacktracedecoroutinator"));
        library.plugins.push(PluginApplication::new("java-library"));
        set.insert(library);

        let report = validate(&set, &ValidationConfig::default());
        assert_eq!(
            kinds(&report),
            vec![&ViolationKind::PluginWithoutVersion {
                plugin: "dev.reformator.stacktracedecoroutinator".into()
            }]
        );
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            module: ":library".into(),
            severity: Severity::Error,
            kind: ViolationKind::PublishingWithoutLicense,
        };
        assert_eq!(
            violation.to_string(),
            "error[:library]: publishing descriptor lists no license"
        );
    }

    #[test]
    fn test_violation_serialization() {
        let violation = Violation {
            module: ":".into(),
            severity: Severity::Warning,
            kind: ViolationKind::PluginWithoutVersion {
                plugin: "com.gradleup.shadow".into(),
            },
        };
        insta::assert_json_snapshot!(violation, @r#"
        {
          "module": ":",
          "severity": "warning",
          "kind": "pluginWithoutVersion",
          "plugin": "com.gradleup.shadow"
        }
        "#);
    }
}
