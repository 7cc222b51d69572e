//! Parser for Gradle Groovy DSL (build.gradle).
//!
//! Groovy allows calls without parentheses (`implementation 'g:a:v'`,
//! `apply plugin: 'java'`) and both quote styles.

use crate::parser::script::{
    Call, Dialect, Vars, parse_build_script, split_top_level, with_plugin_suffix,
};
use lazybuild_core::{BuildScriptParser, Dsl, Module, PluginApplication, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Matches: id 'com.gradleup.shadow' version '8.3.8'
static RE_PLUGIN_ID: OnceLock<Regex> = OnceLock::new();
/// Matches: alias(libs.plugins.shadow)
static RE_PLUGIN_ALIAS: OnceLock<Regex> = OnceLock::new();
/// Matches: def jdaVersion = '5.6.1'
static RE_VARIABLE: OnceLock<Regex> = OnceLock::new();
/// Matches: implementation 'g:a:v'
static RE_COMMAND: OnceLock<Regex> = OnceLock::new();

fn re_plugin_id() -> &'static Regex {
    RE_PLUGIN_ID.get_or_init(|| {
        Regex::new(r#"^id\s*\(?\s*(?:'([^']+)'|"([^"]+)")\s*\)?(.*)$"#).unwrap()
    })
}

fn re_plugin_alias() -> &'static Regex {
    RE_PLUGIN_ALIAS.get_or_init(|| {
        Regex::new(r"^alias\s*\(\s*libs\.plugins\.([\w.]+?)(?:\.get\(\))?\s*\)(.*)$").unwrap()
    })
}

fn re_variable() -> &'static Regex {
    RE_VARIABLE.get_or_init(|| {
        Regex::new(r"(?s)^(?:def\s+(?:String\s+)?|String\s+|ext\.)(\w+)\s*=\s*(.+)$").unwrap()
    })
}

fn re_command() -> &'static Regex {
    RE_COMMAND.get_or_init(|| Regex::new(r"(?s)^([A-Za-z_][\w.]*)\s+([^\s=({].*)$").unwrap())
}

/// Gradle Groovy DSL build scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroovyDslParser;

impl Dialect for GroovyDslParser {
    const DSL: Dsl = Dsl::Groovy;
    const FILE_TYPE: &'static str = "Gradle Groovy DSL";

    fn variable<'s>(&self, code: &'s str) -> Option<(&'s str, &'s str)> {
        let caps = re_variable().captures(code)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
    }

    fn command<'s>(&self, code: &'s str) -> Option<Call<'s>> {
        let caps = re_command().captures(code)?;
        let name = caps.get(1)?.as_str();
        let args = split_top_level(caps.get(2)?.as_str());
        Some(Call::new(name, args))
    }

    fn plugin(&self, code: &str, vars: &Vars) -> Option<PluginApplication> {
        if let Some(caps) = re_plugin_id().captures(code) {
            let id = caps.get(1).or_else(|| caps.get(2))?.as_str();
            let suffix = caps.get(3).map_or("", |m| m.as_str());
            return with_plugin_suffix(PluginApplication::new(id), suffix, vars);
        }
        if let Some(caps) = re_plugin_alias().captures(code) {
            let mut plugin = PluginApplication::new("");
            plugin.catalog_alias = Some(caps[1].to_string());
            return with_plugin_suffix(plugin, &caps[2], vars);
        }
        None
    }
}

impl BuildScriptParser for GroovyDslParser {
    fn file_type(&self) -> &'static str {
        Self::FILE_TYPE
    }

    fn handles(&self, file_name: &str) -> bool {
        file_name.ends_with(".gradle")
    }

    fn parse(&self, content: &str, path: &Path, module: &mut Module) -> Result<()> {
        parse_build_script(self, content, module).map_err(|e| e.at(Self::FILE_TYPE, path))
    }
}
