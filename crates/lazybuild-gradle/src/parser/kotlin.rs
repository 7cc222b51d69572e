//! Parser for Gradle Kotlin DSL (build.gradle.kts).

use crate::parser::script::{Dialect, Vars, parse_build_script, with_plugin_suffix};
use lazybuild_core::{BuildScriptParser, Dsl, Module, PluginApplication, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Matches: id("com.gradleup.shadow") version "8.3.8"
static RE_PLUGIN_ID: OnceLock<Regex> = OnceLock::new();
/// Matches: kotlin("jvm") version "2.0.0"
static RE_PLUGIN_KOTLIN: OnceLock<Regex> = OnceLock::new();
/// Matches: `java-library`
static RE_PLUGIN_BACKTICK: OnceLock<Regex> = OnceLock::new();
/// Matches: alias(libs.plugins.shadow) apply false
static RE_PLUGIN_ALIAS: OnceLock<Regex> = OnceLock::new();
/// Matches: application
static RE_PLUGIN_BARE: OnceLock<Regex> = OnceLock::new();
/// Matches: val jdaVersion = "5.6.1"
static RE_VARIABLE: OnceLock<Regex> = OnceLock::new();

fn re_plugin_id() -> &'static Regex {
    RE_PLUGIN_ID.get_or_init(|| Regex::new(r#"^id\s*\(\s*"([^"]+)"\s*\)(.*)$"#).unwrap())
}

fn re_plugin_kotlin() -> &'static Regex {
    RE_PLUGIN_KOTLIN.get_or_init(|| Regex::new(r#"^kotlin\s*\(\s*"([^"]+)"\s*\)(.*)$"#).unwrap())
}

fn re_plugin_backtick() -> &'static Regex {
    RE_PLUGIN_BACKTICK.get_or_init(|| Regex::new(r"^`([\w.-]+)`(.*)$").unwrap())
}

fn re_plugin_alias() -> &'static Regex {
    RE_PLUGIN_ALIAS.get_or_init(|| {
        Regex::new(r"^alias\s*\(\s*libs\.plugins\.([\w.]+?)(?:\.get\(\))?\s*\)(.*)$").unwrap()
    })
}

fn re_plugin_bare() -> &'static Regex {
    RE_PLUGIN_BARE.get_or_init(|| Regex::new(r"^([a-z][\w]*)$").unwrap())
}

fn re_variable() -> &'static Regex {
    RE_VARIABLE.get_or_init(|| {
        Regex::new(
            r"(?s)^(?:(?:private|internal|const)\s+)*va[lr]\s+(\w+)(?:\s*:\s*[\w.?<>]+)?\s*=\s*(.+)$",
        )
        .unwrap()
    })
}

/// Gradle Kotlin DSL build scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinDslParser;

impl Dialect for KotlinDslParser {
    const DSL: Dsl = Dsl::Kotlin;
    const FILE_TYPE: &'static str = "Gradle Kotlin DSL";

    fn variable<'s>(&self, code: &'s str) -> Option<(&'s str, &'s str)> {
        let caps = re_variable().captures(code)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
    }

    fn plugin(&self, code: &str, vars: &Vars) -> Option<PluginApplication> {
        if let Some(caps) = re_plugin_id().captures(code) {
            return with_plugin_suffix(PluginApplication::new(&caps[1]), &caps[2], vars);
        }
        if let Some(caps) = re_plugin_kotlin().captures(code) {
            let plugin = PluginApplication::new(format!("org.jetbrains.kotlin.{}", &caps[1]));
            return with_plugin_suffix(plugin, &caps[2], vars);
        }
        if let Some(caps) = re_plugin_backtick().captures(code) {
            return with_plugin_suffix(PluginApplication::new(&caps[1]), &caps[2], vars);
        }
        if let Some(caps) = re_plugin_alias().captures(code) {
            let mut plugin = PluginApplication::new("");
            plugin.catalog_alias = Some(caps[1].to_string());
            return with_plugin_suffix(plugin, &caps[2], vars);
        }
        re_plugin_bare()
            .captures(code)
            .map(|caps| PluginApplication::new(&caps[1]))
    }
}

impl BuildScriptParser for KotlinDslParser {
    fn file_type(&self) -> &'static str {
        Self::FILE_TYPE
    }

    fn handles(&self, file_name: &str) -> bool {
        file_name.ends_with(".gradle.kts")
    }

    fn parse(&self, content: &str, path: &Path, module: &mut Module) -> Result<()> {
        parse_build_script(self, content, module).map_err(|e| e.at(Self::FILE_TYPE, path))
    }
}
