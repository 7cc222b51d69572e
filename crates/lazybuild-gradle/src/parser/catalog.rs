//! Parser for Gradle Version Catalog (gradle/libs.versions.toml).
//!
//! Handles \[versions\], \[libraries\] and \[plugins\] sections, resolving
//! `version.ref` against \[versions\].

use crate::error::{GradleError, Result};
use lazybuild_core::{Coordinate, PluginApplication, VersionCatalog};
use std::collections::BTreeMap;
use toml_edit::DocumentMut;

pub fn parse_version_catalog(content: &str) -> Result<VersionCatalog> {
    let doc: DocumentMut =
        content
            .parse()
            .map_err(|e: toml_edit::TomlError| GradleError::Catalog {
                message: e.to_string(),
            })?;

    let mut catalog = VersionCatalog::default();

    // Collect [versions] section: key -> version string
    if let Some(versions_item) = doc.get("versions")
        && let Some(versions_table) = versions_item.as_table()
    {
        for (key, item) in versions_table {
            if let Some(version) = item.as_str() {
                catalog.versions.insert(key.to_string(), version.to_string());
            } else if let Some(rich) = item.as_inline_table()
                && let Some(version) = rich_version(rich)
            {
                catalog.versions.insert(key.to_string(), version);
            }
        }
    }

    if let Some(libs_item) = doc.get("libraries")
        && let Some(libs_table) = libs_item.as_table()
    {
        for (alias, item) in libs_table {
            match parse_library_entry(item, &catalog.versions) {
                Some(coordinate) => {
                    catalog.libraries.insert(alias.to_string(), coordinate);
                }
                None => tracing::warn!("Skipping unreadable catalog library '{}'", alias),
            }
        }
    }

    if let Some(plugins_item) = doc.get("plugins")
        && let Some(plugins_table) = plugins_item.as_table()
    {
        for (alias, item) in plugins_table {
            match parse_plugin_entry(item, &catalog.versions) {
                Some(plugin) => {
                    catalog.plugins.insert(alias.to_string(), plugin);
                }
                None => tracing::warn!("Skipping unreadable catalog plugin '{}'", alias),
            }
        }
    }

    tracing::debug!(
        "Parsed version catalog: {} versions, {} libraries, {} plugins",
        catalog.versions.len(),
        catalog.libraries.len(),
        catalog.plugins.len()
    );
    Ok(catalog)
}

/// `{ strictly = "..", require = "..", prefer = ".." }`
fn rich_version(table: &toml_edit::InlineTable) -> Option<String> {
    ["strictly", "require", "prefer"]
        .into_iter()
        .find_map(|key| table.get(key)?.as_str())
        .map(str::to_string)
}

fn parse_library_entry(
    item: &toml_edit::Item,
    versions: &BTreeMap<String, String>,
) -> Option<Coordinate> {
    if let Some(notation) = item.as_str() {
        return Coordinate::parse(notation);
    }
    if let Some(inline) = item.as_inline_table() {
        let mut coordinate = coordinate_from_inline(inline)?;
        coordinate.version = version_from_inline(inline, versions);
        return Some(coordinate);
    }
    if let Some(table) = item.as_table() {
        let mut coordinate = coordinate_from_table(table)?;
        coordinate.version = version_from_table(table, versions);
        return Some(coordinate);
    }
    None
}

fn parse_plugin_entry(
    item: &toml_edit::Item,
    versions: &BTreeMap<String, String>,
) -> Option<PluginApplication> {
    // "com.gradleup.shadow:8.3.8"
    if let Some(notation) = item.as_str() {
        let (id, version) = notation.split_once(':').unwrap_or((notation, ""));
        let mut plugin = PluginApplication::new(id);
        if !version.is_empty() {
            plugin.version = Some(version.to_string());
        }
        return Some(plugin);
    }
    if let Some(inline) = item.as_inline_table() {
        let mut plugin = PluginApplication::new(inline.get("id")?.as_str()?);
        plugin.version = version_from_inline(inline, versions);
        return Some(plugin);
    }
    if let Some(table) = item.as_table() {
        let mut plugin = PluginApplication::new(table.get("id")?.as_str()?);
        plugin.version = version_from_table(table, versions);
        return Some(plugin);
    }
    None
}

fn coordinate_from_inline(table: &toml_edit::InlineTable) -> Option<Coordinate> {
    if let Some(module_val) = table.get("module") {
        return Coordinate::parse(module_val.as_str()?);
    }
    let group = table.get("group")?.as_str()?;
    let name = table.get("name")?.as_str()?;
    Some(Coordinate::new(group, name))
}

fn coordinate_from_table(table: &toml_edit::Table) -> Option<Coordinate> {
    if let Some(module_item) = table.get("module") {
        return Coordinate::parse(module_item.as_str()?);
    }
    let group = table.get("group")?.as_str()?;
    let name = table.get("name")?.as_str()?;
    Some(Coordinate::new(group, name))
}

fn version_from_inline(
    table: &toml_edit::InlineTable,
    versions: &BTreeMap<String, String>,
) -> Option<String> {
    let version_val = table.get("version")?;
    if let Some(version) = version_val.as_str() {
        return Some(version.to_string());
    }
    let version_table = version_val.as_inline_table()?;
    if let Some(ref_val) = version_table.get("ref") {
        return lookup_ref(ref_val.as_str()?, versions);
    }
    rich_version(version_table)
}

fn version_from_table(
    table: &toml_edit::Table,
    versions: &BTreeMap<String, String>,
) -> Option<String> {
    let version_item = table.get("version")?;
    if let Some(version) = version_item.as_str() {
        return Some(version.to_string());
    }

    if let Some(version_table) = version_item.as_table()
        && let Some(ref_item) = version_table.get("ref")
    {
        return lookup_ref(ref_item.as_str()?, versions);
    }

    let version_table = version_item.as_inline_table()?;
    if let Some(ref_val) = version_table.get("ref") {
        return lookup_ref(ref_val.as_str()?, versions);
    }
    rich_version(version_table)
}

fn lookup_ref(key: &str, versions: &BTreeMap<String, String>) -> Option<String> {
    let version = versions.get(key).cloned();
    if version.is_none() {
        tracing::warn!("Version catalog reference '{}' is not declared in [versions]", key);
    }
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[versions]
jda = "5.6.1"
shadow = "8.3.8"
logback = { strictly = "1.5.18" }

[libraries]
jda = { module = "net.dv8tion:JDA", version.ref = "jda" }
gson = "com.google.code.gson:gson:2.3.1"
logback-classic = { group = "ch.qos.logback", name = "logback-classic", version.ref = "logback" }
annotations = { module = "org.jetbrains:annotations" }
hikari = { module = "com.zaxxer:HikariCP", version = "7.0.0" }
broken = { version = "1.0" }

[libraries.flyway-core]
module = "org.flywaydb:flyway-core"
version = "11.11.2"

[plugins]
shadow = { id = "com.gradleup.shadow", version.ref = "shadow" }
galaxy = "xyz.srnyx.gradle-galaxy:1.3.3"
"#;

    #[test]
    fn test_versions() {
        let catalog = parse_version_catalog(CATALOG).unwrap();
        assert_eq!(catalog.versions.get("jda").map(String::as_str), Some("5.6.1"));
        assert_eq!(
            catalog.versions.get("logback").map(String::as_str),
            Some("1.5.18")
        );
    }

    #[test]
    fn test_libraries() {
        let catalog = parse_version_catalog(CATALOG).unwrap();
        let lib = |alias: &str| catalog.libraries.get(alias).map(ToString::to_string);

        assert_eq!(lib("jda").as_deref(), Some("net.dv8tion:JDA:5.6.1"));
        assert_eq!(lib("gson").as_deref(), Some("com.google.code.gson:gson:2.3.1"));
        assert_eq!(
            lib("logback-classic").as_deref(),
            Some("ch.qos.logback:logback-classic:1.5.18")
        );
        assert_eq!(lib("annotations").as_deref(), Some("org.jetbrains:annotations"));
        assert_eq!(lib("hikari").as_deref(), Some("com.zaxxer:HikariCP:7.0.0"));
        assert_eq!(
            lib("flyway-core").as_deref(),
            Some("org.flywaydb:flyway-core:11.11.2")
        );
        assert!(lib("broken").is_none());
    }

    #[test]
    fn test_plugins() {
        let catalog = parse_version_catalog(CATALOG).unwrap();
        let shadow = &catalog.plugins["shadow"];
        assert_eq!(shadow.id, "com.gradleup.shadow");
        assert_eq!(shadow.version.as_deref(), Some("8.3.8"));

        let galaxy = &catalog.plugins["galaxy"];
        assert_eq!(galaxy.id, "xyz.srnyx.gradle-galaxy");
        assert_eq!(galaxy.version.as_deref(), Some("1.3.3"));
    }

    #[test]
    fn test_missing_ref_leaves_version_empty() {
        let catalog = parse_version_catalog(
            "[libraries]\njda = { module = \"net.dv8tion:JDA\", version.ref = \"nope\" }\n",
        )
        .unwrap();
        assert!(catalog.libraries["jda"].version.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let result = parse_version_catalog("[versions\njda = ");
        assert!(matches!(result, Err(GradleError::Catalog { .. })));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = parse_version_catalog("").unwrap();
        assert_eq!(catalog, VersionCatalog::default());
    }
}
