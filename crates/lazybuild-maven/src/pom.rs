//! pom.xml rendering for published modules.
//!
//! Writes the POM a `maven-publish` publication would carry: coordinates,
//! project metadata, licenses, developers and the published dependencies.

use crate::error::{MavenError, Result};
use crate::scope::MavenScope;
use lazybuild_core::{EffectiveModule, ResolvedBuild};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";

type PomWriter = Writer<Cursor<Vec<u8>>>;

/// A dependency as written to (or read from) a POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: MavenScope,
}

/// Renders the POM of the module at `path`.
///
/// # Errors
///
/// - `MavenError::Core` - `path` is not a module of `build`
/// - `MavenError::NotPublished` - the module has no publishing descriptor
/// - `MavenError::MissingCoordinate` - no group or version could be resolved
pub fn render_pom(build: &ResolvedBuild, path: &str) -> Result<String> {
    let module = build.module(path)?;
    let publishing = module
        .publishing
        .as_ref()
        .ok_or_else(|| MavenError::NotPublished {
            module: module.path.clone(),
        })?;

    let group_id = publishing
        .group_id
        .as_deref()
        .or(module.group.as_deref())
        .ok_or_else(|| missing(module, "group"))?;
    let artifact_id = publishing.artifact_id.as_deref().unwrap_or(&module.name);
    let version = module
        .version
        .as_deref()
        .ok_or_else(|| missing(module, "version"))?;

    let dependencies = published_dependencies(build, module);
    tracing::debug!(
        "Rendering pom.xml for {} ({}:{}:{}) with {} dependencies",
        module.path,
        group_id,
        artifact_id,
        version,
        dependencies.len()
    );

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("project").with_attributes([
        ("xmlns", POM_NAMESPACE),
        ("xmlns:xsi", XSI_NAMESPACE),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
    ])))?;

    text_element(&mut writer, "modelVersion", "4.0.0")?;
    text_element(&mut writer, "groupId", group_id)?;
    text_element(&mut writer, "artifactId", artifact_id)?;
    text_element(&mut writer, "version", version)?;
    text_element(&mut writer, "name", &module.name)?;
    if let Some(description) = &module.description {
        text_element(&mut writer, "description", description)?;
    }
    if let Some(url) = &publishing.url {
        text_element(&mut writer, "url", url)?;
    }

    if !publishing.licenses.is_empty() {
        start(&mut writer, "licenses")?;
        for license in &publishing.licenses {
            start(&mut writer, "license")?;
            text_element(&mut writer, "name", &license.name)?;
            optional_element(&mut writer, "url", license.url.as_deref())?;
            end(&mut writer, "license")?;
        }
        end(&mut writer, "licenses")?;
    }

    if !publishing.developers.is_empty() {
        start(&mut writer, "developers")?;
        for developer in &publishing.developers {
            start(&mut writer, "developer")?;
            text_element(&mut writer, "id", &developer.id)?;
            optional_element(&mut writer, "name", developer.name.as_deref())?;
            optional_element(&mut writer, "email", developer.email.as_deref())?;
            optional_element(&mut writer, "url", developer.url.as_deref())?;
            end(&mut writer, "developer")?;
        }
        end(&mut writer, "developers")?;
    }

    if !dependencies.is_empty() {
        start(&mut writer, "dependencies")?;
        for dep in &dependencies {
            start(&mut writer, "dependency")?;
            text_element(&mut writer, "groupId", &dep.group_id)?;
            text_element(&mut writer, "artifactId", &dep.artifact_id)?;
            optional_element(&mut writer, "version", dep.version.as_deref())?;
            text_element(&mut writer, "scope", dep.scope.as_str())?;
            end(&mut writer, "dependency")?;
        }
        end(&mut writer, "dependencies")?;
    }

    end(&mut writer, "project")?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

/// External and project dependencies in the order they are published.
///
/// Platforms are imported BOMs rather than dependencies and are skipped.
pub fn published_dependencies(build: &ResolvedBuild, module: &EffectiveModule) -> Vec<PomDependency> {
    let mut published = Vec::new();

    for dep in &module.dependencies {
        let Some(scope) = MavenScope::from_gradle(dep.scope) else {
            continue;
        };
        if dep.platform {
            tracing::debug!("Not publishing platform {}", dep.coordinate);
            continue;
        }
        published.push(PomDependency {
            group_id: dep.coordinate.group.clone(),
            artifact_id: dep.coordinate.artifact.clone(),
            version: dep.coordinate.version.clone(),
            scope,
        });
    }

    for dep in &module.project_dependencies {
        let Some(scope) = MavenScope::from_gradle(dep.scope) else {
            continue;
        };
        let Ok(target) = build.module(&dep.path) else {
            tracing::warn!(
                "Module {} depends on unknown module {}",
                module.path,
                dep.path
            );
            continue;
        };
        let target_publishing = target.publishing.as_ref();
        let Some(group_id) = target_publishing
            .and_then(|p| p.group_id.clone())
            .or_else(|| target.group.clone())
        else {
            tracing::warn!("Module {} has no group, not publishing it as a dependency", target.path);
            continue;
        };
        published.push(PomDependency {
            group_id,
            artifact_id: target_publishing
                .and_then(|p| p.artifact_id.clone())
                .unwrap_or_else(|| target.name.clone()),
            version: target.version.clone(),
            scope,
        });
    }

    published
}

fn missing(module: &EffectiveModule, what: &'static str) -> MavenError {
    MavenError::MissingCoordinate {
        module: module.path.clone(),
        what,
    }
}

fn start(writer: &mut PomWriter, name: &str) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut PomWriter, name: &str) -> std::io::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut PomWriter, name: &str, text: &str) -> std::io::Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn optional_element(writer: &mut PomWriter, name: &str, text: Option<&str>) -> std::io::Result<()> {
    match text {
        Some(text) => text_element(writer, name, text),
        None => Ok(()),
    }
}
