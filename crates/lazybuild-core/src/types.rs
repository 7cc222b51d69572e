//! Declarative records that make up a module: dependencies, plugins,
//! repositories, publishing metadata and packaging options.

use crate::position::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gradle configuration a dependency is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    Api,
    Implementation,
    CompileOnly,
    CompileOnlyApi,
    RuntimeOnly,
    TestImplementation,
    TestCompileOnly,
    TestRuntimeOnly,
    AnnotationProcessor,
}

impl Scope {
    pub const ALL: [Self; 9] = [
        Self::Api,
        Self::Implementation,
        Self::CompileOnly,
        Self::CompileOnlyApi,
        Self::RuntimeOnly,
        Self::TestImplementation,
        Self::TestCompileOnly,
        Self::TestRuntimeOnly,
        Self::AnnotationProcessor,
    ];

    /// Parses a configuration name as written in a build script.
    ///
    /// Returns `None` for configurations this model does not track
    /// (`kapt`, `classpath`, custom configurations).
    pub fn from_configuration(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Implementation => "implementation",
            Self::CompileOnly => "compileOnly",
            Self::CompileOnlyApi => "compileOnlyApi",
            Self::RuntimeOnly => "runtimeOnly",
            Self::TestImplementation => "testImplementation",
            Self::TestCompileOnly => "testCompileOnly",
            Self::TestRuntimeOnly => "testRuntimeOnly",
            Self::AnnotationProcessor => "annotationProcessor",
        }
    }

    /// Whether consumers of the module see this dependency.
    pub const fn is_exported(self) -> bool {
        matches!(self, Self::Api | Self::CompileOnlyApi)
    }

    pub const fn on_compile_classpath(self) -> bool {
        matches!(
            self,
            Self::Api
                | Self::Implementation
                | Self::CompileOnly
                | Self::CompileOnlyApi
                | Self::TestImplementation
                | Self::TestCompileOnly
        )
    }

    pub const fn on_runtime_classpath(self) -> bool {
        matches!(
            self,
            Self::Api
                | Self::Implementation
                | Self::RuntimeOnly
                | Self::TestImplementation
                | Self::TestRuntimeOnly
        )
    }

    pub const fn is_test(self) -> bool {
        matches!(
            self,
            Self::TestImplementation | Self::TestCompileOnly | Self::TestRuntimeOnly
        )
    }

    /// Classpath family. Declaring one coordinate in two scopes is only a
    /// conflict when both scopes belong to the same family.
    pub const fn family(self) -> ScopeFamily {
        match self {
            Self::TestImplementation | Self::TestCompileOnly | Self::TestRuntimeOnly => {
                ScopeFamily::Test
            }
            Self::AnnotationProcessor => ScopeFamily::AnnotationProcessor,
            _ => ScopeFamily::Main,
        }
    }
}

/// Independent groups of classpaths: main sources, test sources and the
/// compiler's annotation processor path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeFamily {
    Main,
    Test,
    AnnotationProcessor,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maven coordinates. The version is optional because build scripts may
/// leave it to a platform or catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Coordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parses `group:artifact[:version]`.
    pub fn parse(notation: &str) -> Option<Self> {
        let mut parts = notation.splitn(3, ':');
        let group = parts.next()?.trim();
        let artifact = parts.next()?.trim();
        if group.is_empty() || artifact.is_empty() {
            return None;
        }
        let version = parts
            .next()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Some(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version,
        })
    }

    /// Canonical identifier: "{group}:{artifact}".
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// Both group and artifact are known. Unresolved catalog aliases leave
    /// them empty.
    pub fn is_complete(&self) -> bool {
        !self.group.is_empty() && !self.artifact.is_empty()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{v}", self.group, self.artifact),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDeclaration {
    pub scope: Scope,
    pub coordinate: Coordinate,
    /// Imported as `platform(..)` / `enforcedPlatform(..)`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub platform: bool,
    /// Version catalog alias (`libs.gson` -> `gson`) the coordinate came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_alias: Option<String>,
    /// Trailing `// comment` on the declaring line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub range: Range,
}

impl DependencyDeclaration {
    pub fn new(scope: Scope, coordinate: Coordinate) -> Self {
        Self {
            scope,
            coordinate,
            platform: false,
            catalog_alias: None,
            comment: None,
            range: Range::default(),
        }
    }
}

/// Dependency on another module of the same build, `project(":library")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDependency {
    pub scope: Scope,
    pub path: String,
    #[serde(default)]
    pub range: Range,
}

/// Plugins bundled with Gradle itself; they never carry a version.
pub const CORE_PLUGINS: &[&str] = &[
    "application",
    "base",
    "distribution",
    "groovy",
    "idea",
    "eclipse",
    "jacoco",
    "java",
    "java-library",
    "java-platform",
    "java-test-fixtures",
    "maven-publish",
    "signing",
    "checkstyle",
    "pmd",
    "version-catalog",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginApplication {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `false` for `apply false` declarations that only pin a version.
    pub apply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_alias: Option<String>,
    /// Catalog version accessor (`libs.versions.shadow` -> `shadow`) the
    /// version is taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_ref: Option<String>,
}

impl PluginApplication {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            apply: true,
            catalog_alias: None,
            version_ref: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn is_core(&self) -> bool {
        CORE_PLUGINS.contains(&self.id.as_str()) || self.id.starts_with("org.gradle.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn maven_central() -> Self {
        Self::new("MavenCentral", "https://repo.maven.apache.org/maven2/")
    }

    pub fn jitpack() -> Self {
        Self::new("JitPack", "https://jitpack.io/")
    }

    /// Resolves the repository shortcut functions of the Gradle DSL
    /// (`mavenCentral()`, `google()`, ...).
    pub fn from_shortcut(name: &str) -> Option<Self> {
        Some(match name {
            "mavenCentral" => Self::maven_central(),
            "gradlePluginPortal" => {
                Self::new("GradlePluginPortal", "https://plugins.gradle.org/m2/")
            }
            "google" => Self::new("Google", "https://dl.google.com/dl/android/maven2/"),
            "mavenLocal" => Self::new("MavenLocal", "file:~/.m2/repository/"),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Developer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            url: None,
        }
    }
}

/// Metadata attached to a published artifact. No behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingDescriptor {
    /// Publication name, `maven` unless the script says otherwise.
    pub publication: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Defaults to the module name during resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub licenses: Vec<License>,
    #[serde(default)]
    pub developers: Vec<Developer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kotlin_jvm_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javadoc_jar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_jar: Option<bool>,
}

impl CompilerOptions {
    pub const fn is_empty(&self) -> bool {
        self.java_version.is_none()
            && self.kotlin_jvm_target.is_none()
            && self.encoding.is_none()
            && self.javadoc_jar.is_none()
            && self.sources_jar.is_none()
    }

    /// Fills every unset field from `defaults`.
    #[must_use]
    pub fn or(&self, defaults: &Self) -> Self {
        Self {
            java_version: self
                .java_version
                .clone()
                .or_else(|| defaults.java_version.clone()),
            kotlin_jvm_target: self
                .kotlin_jvm_target
                .clone()
                .or_else(|| defaults.kotlin_jvm_target.clone()),
            encoding: self.encoding.clone().or_else(|| defaults.encoding.clone()),
            javadoc_jar: self.javadoc_jar.or(defaults.javadoc_jar),
            sources_jar: self.sources_jar.or(defaults.sources_jar),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub from: String,
    pub to: String,
}

/// Shadow (fat jar) packaging options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowOptions {
    #[serde(default)]
    pub merge_service_files: bool,
    #[serde(default)]
    pub minimize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relocations: Vec<Relocation>,
}

/// Ordering constraint between tasks, evaluated by the external build engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWiring {
    pub task: String,
    pub depends_on: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_configuration() {
        assert_eq!(Scope::from_configuration("api"), Some(Scope::Api));
        assert_eq!(
            Scope::from_configuration("compileOnlyApi"),
            Some(Scope::CompileOnlyApi)
        );
        assert_eq!(
            Scope::from_configuration("runtimeOnly"),
            Some(Scope::RuntimeOnly)
        );
        assert_eq!(Scope::from_configuration("kapt"), None);
        assert_eq!(Scope::from_configuration("Api"), None);
    }

    #[test]
    fn test_scope_propagation() {
        assert!(Scope::Api.is_exported());
        assert!(Scope::CompileOnlyApi.is_exported());
        assert!(!Scope::Implementation.is_exported());

        assert!(Scope::CompileOnly.on_compile_classpath());
        assert!(!Scope::CompileOnly.on_runtime_classpath());
        assert!(Scope::RuntimeOnly.on_runtime_classpath());
        assert!(!Scope::RuntimeOnly.on_compile_classpath());
        assert!(Scope::TestRuntimeOnly.is_test());
    }

    #[test]
    fn test_scope_families() {
        assert_eq!(Scope::CompileOnly.family(), ScopeFamily::Main);
        assert_eq!(Scope::RuntimeOnly.family(), ScopeFamily::Main);
        assert_eq!(Scope::TestImplementation.family(), ScopeFamily::Test);
        assert_eq!(
            Scope::AnnotationProcessor.family(),
            ScopeFamily::AnnotationProcessor
        );
    }

    #[test]
    fn test_coordinate_is_complete() {
        assert!(Coordinate::new("com.google.code.gson", "gson").is_complete());
        assert!(!Coordinate::default().is_complete());
        assert!(!Coordinate::new("", "gson").is_complete());
    }

    #[test]
    fn test_scope_serde_names() {
        let json = serde_json::to_string(&Scope::CompileOnlyApi).unwrap();
        assert_eq!(json, "\"compileOnlyApi\"");
        let scope: Scope = serde_json::from_str("\"runtimeOnly\"").unwrap();
        assert_eq!(scope, Scope::RuntimeOnly);
    }

    #[test]
    fn test_coordinate_parse() {
        let c = Coordinate::parse("ch.qos.logback:logback-classic:1.5.18").unwrap();
        assert_eq!(c.group, "ch.qos.logback");
        assert_eq!(c.artifact, "logback-classic");
        assert_eq!(c.version.as_deref(), Some("1.5.18"));
        assert_eq!(c.key(), "ch.qos.logback:logback-classic");
        assert_eq!(c.to_string(), "ch.qos.logback:logback-classic:1.5.18");

        let c = Coordinate::parse("com.zaxxer:HikariCP").unwrap();
        assert!(c.version.is_none());

        assert!(Coordinate::parse("nocolon").is_none());
        assert!(Coordinate::parse(":artifact:1.0").is_none());
    }

    #[test]
    fn test_coordinate_version_keeps_classifier_colons() {
        let c = Coordinate::parse("g:a:1.0:linux").unwrap();
        assert_eq!(c.version.as_deref(), Some("1.0:linux"));
    }

    #[test]
    fn test_core_plugins() {
        assert!(PluginApplication::new("java-library").is_core());
        assert!(PluginApplication::new("org.gradle.toolchains.foojay-resolver").is_core());
        assert!(!PluginApplication::new("com.gradleup.shadow").is_core());
    }

    #[test]
    fn test_repository_shortcuts() {
        assert_eq!(
            Repository::from_shortcut("mavenCentral"),
            Some(Repository::maven_central())
        );
        assert!(Repository::from_shortcut("gradlePluginPortal").is_some());
        assert!(Repository::from_shortcut("jcenter").is_none());
    }

    #[test]
    fn test_compiler_options_or() {
        let own = CompilerOptions {
            java_version: Some("22".into()),
            ..Default::default()
        };
        let defaults = CompilerOptions {
            java_version: Some("17".into()),
            encoding: Some("UTF-8".into()),
            javadoc_jar: Some(true),
            ..Default::default()
        };
        let merged = own.or(&defaults);
        assert_eq!(merged.java_version.as_deref(), Some("22"));
        assert_eq!(merged.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(merged.javadoc_jar, Some(true));
        assert!(merged.sources_jar.is_none());
        assert!(CompilerOptions::default().is_empty());
        assert!(!merged.is_empty());
    }

    #[test]
    fn test_dependency_declaration_serialization() {
        let dep = DependencyDeclaration::new(
            Scope::Api,
            Coordinate::new("com.google.code.gson", "gson").with_version("2.3.1"),
        );
        insta::assert_json_snapshot!(dep, @r#"
        {
          "scope": "api",
          "coordinate": {
            "group": "com.google.code.gson",
            "artifact": "gson",
            "version": "2.3.1"
          },
          "range": {
            "start": {
              "line": 0,
              "character": 0
            },
            "end": {
              "line": 0,
              "character": 0
            }
          }
        }
        "#);
    }
}
