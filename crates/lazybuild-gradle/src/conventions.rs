//! Helpers from the gradle-galaxy and dkim-gradle plugins that expand into
//! plain declarations (`setupJda`, `setupPublishing`, `repository`,
//! `setLanguageVersion`).

use lazybuild_core::{
    Coordinate, DependencyDeclaration, Developer, License, Module, PluginApplication,
    PublishingDescriptor, Repository, Scope,
};

pub const JDA_GROUP: &str = "net.dv8tion";
pub const JDA_ARTIFACT: &str = "JDA";

/// Arguments of `setupJda(jdaVersion, group, version, description, javaVersion)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JdaSetup {
    pub jda_version: Option<String>,
    pub group: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub java_version: Option<String>,
}

impl JdaSetup {
    /// Adds the JDA `api` dependency and sets the module metadata.
    pub fn apply(self, module: &mut Module) {
        let mut coordinate = Coordinate::new(JDA_GROUP, JDA_ARTIFACT);
        coordinate.version = self.jda_version;
        module
            .dependencies
            .push(DependencyDeclaration::new(Scope::Api, coordinate));

        if self.group.is_some() {
            module.group = self.group;
        }
        if self.version.is_some() {
            module.version = self.version;
        }
        if self.description.is_some() {
            module.description = self.description;
        }
        if self.java_version.is_some() {
            module.compiler.java_version = self.java_version;
        }
    }
}

/// `setupPublishing(..)` configures a `maven` publication and applies
/// `maven-publish`.
pub fn apply_publishing(module: &mut Module, descriptor: PublishingDescriptor) {
    if module.applied_plugin("maven-publish").is_none() {
        module.plugins.push(PluginApplication::new("maven-publish"));
    }
    module.publishing = Some(descriptor);
}

/// `LicenseData.<CONSTANT>`.
pub fn license(constant: &str) -> License {
    let (name, url) = match constant {
        "MIT" => ("MIT License", "https://opensource.org/licenses/MIT"),
        "APACHE_2_0" | "APACHE" => (
            "Apache License 2.0",
            "https://www.apache.org/licenses/LICENSE-2.0",
        ),
        "GPL_3_0" | "GPL" => (
            "GNU General Public License v3.0",
            "https://www.gnu.org/licenses/gpl-3.0.html",
        ),
        "LGPL_3_0" => (
            "GNU Lesser General Public License v3.0",
            "https://www.gnu.org/licenses/lgpl-3.0.html",
        ),
        other => {
            tracing::debug!("Unknown LicenseData constant '{}'", other);
            return License {
                name: other.to_string(),
                url: None,
            };
        }
    };
    License {
        name: name.to_string(),
        url: Some(url.to_string()),
    }
}

/// `DeveloperData.<name>`: the developer id is the accessor name.
pub fn developer(name: &str) -> Developer {
    let mut developer = Developer::new(name);
    developer.name = Some(name.to_string());
    developer
}

/// `Repository.<CONSTANT>` as passed to `repository(..)`.
pub fn repository(constant: &str) -> Option<Repository> {
    match constant {
        "MAVEN_CENTRAL" => Some(Repository::maven_central()),
        "JITPACK" => Some(Repository::jitpack()),
        "MAVEN_LOCAL" => Repository::from_shortcut("mavenLocal"),
        "GOOGLE" => Repository::from_shortcut("google"),
        "GRADLE_PLUGIN_PORTAL" => Repository::from_shortcut("gradlePluginPortal"),
        "SONATYPE_SNAPSHOTS" => Some(Repository::new(
            "SonatypeSnapshots",
            "https://oss.sonatype.org/content/repositories/snapshots/",
        )),
        "PAPER" => Some(Repository::new(
            "Paper",
            "https://repo.papermc.io/repository/maven-public/",
        )),
        _ => None,
    }
}
