//! Parser for settings.gradle(.kts): project name, included modules and
//! build-wide repositories.

use crate::error::Result;
use crate::parser::blocks::scan;
use crate::parser::groovy::GroovyDslParser;
use crate::parser::kotlin::KotlinDslParser;
use crate::parser::script::{Dialect, Op, Script};
use lazybuild_core::Repository;
use lazybuild_core::module::normalize_path;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradleSettings {
    /// `rootProject.name`.
    pub root_name: Option<String>,
    /// Included module paths, normalised to `:name` form.
    pub includes: Vec<String>,
    /// `dependencyResolutionManagement { repositories { } }`.
    pub repositories: Vec<Repository>,
}

/// Parses a settings script, picking the dialect from the file name.
///
/// # Errors
///
/// Returns an error if the script structure is unreadable.
pub fn parse_settings(content: &str, path: &Path) -> lazybuild_core::Result<GradleSettings> {
    let kotlin = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".kts"));
    if kotlin {
        settings_from(&KotlinDslParser, content)
            .map_err(|e| e.at(KotlinDslParser::FILE_TYPE, path))
    } else {
        settings_from(&GroovyDslParser, content)
            .map_err(|e| e.at(GroovyDslParser::FILE_TYPE, path))
    }
}

fn settings_from<D: Dialect>(dialect: &D, content: &str) -> Result<GradleSettings> {
    let root = scan(content)?;
    let script = Script::new(dialect, content, &root);
    let mut settings = GradleSettings::default();

    for stmt in &root.statements {
        match script.operation(&stmt.code) {
            Some(Op::Assign("rootProject.name", expr)) => settings.root_name = script.literal(expr),
            Some(Op::Call(call)) if call.name == "include" => {
                for arg in &call.args {
                    match script.literal(arg) {
                        Some(path) => {
                            let path = normalize_path(&path);
                            if !settings.includes.contains(&path) {
                                settings.includes.push(path);
                            }
                        }
                        None => tracing::debug!("Skipping non-literal include '{}'", arg),
                    }
                }
            }
            _ => {}
        }
    }

    for management in root.named("dependencyResolutionManagement") {
        for repositories in management.named("repositories") {
            settings
                .repositories
                .extend(script.repositories(repositories));
        }
    }

    tracing::debug!(
        "Parsed settings: root '{}', {} included modules",
        settings.root_name.as_deref().unwrap_or("<unnamed>"),
        settings.includes.len()
    );
    Ok(settings)
}
