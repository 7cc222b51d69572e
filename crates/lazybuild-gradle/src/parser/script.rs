//! Interpretation of scanned build scripts.
//!
//! Both dialects share the block structure and most statement shapes; a
//! [`Dialect`] supplies only what differs (variable declarations,
//! parenthesis-free calls, the `plugins { }` grammar).

use crate::conventions::{self, JdaSetup};
use crate::error::Result;
use crate::parser::blocks::{Block, Statement, scan};
use lazybuild_core::module::normalize_path;
use lazybuild_core::{
    CompilerOptions, Coordinate, DependencyDeclaration, Developer, Dsl, License, LineOffsetTable,
    Module, PluginApplication, ProjectDependency, PublishingDescriptor, Range, Relocation,
    Repository, Scope, ShadowOptions, SharedDefaults, SharedTarget, TaskWiring,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Literal `val`/`def` values visible to string templates.
pub(crate) type Vars = HashMap<String, String>;

/// Plugin ids that produce a shadow (fat) jar.
pub const SHADOW_PLUGINS: &[&str] = &[
    "com.gradleup.shadow",
    "com.github.johnrengelman.shadow",
    "io.github.goooler.shadow",
];

/// Calls with a single argument that set a property (`group 'x'`,
/// `url "https://.."`).
const PROPERTY_KEYS: &[&str] = &[
    "group",
    "version",
    "description",
    "mainClass",
    "mainClassName",
    "sourceCompatibility",
    "targetCompatibility",
    "encoding",
    "jvmTarget",
    "languageVersion",
    "archiveClassifier",
    "classifier",
    "url",
    "name",
    "id",
    "email",
    "groupId",
    "artifactId",
];

static RE_CALL_HEAD: OnceLock<Regex> = OnceLock::new();
static RE_ASSIGN: OnceLock<Regex> = OnceLock::new();
static RE_NAMED_ARG: OnceLock<Regex> = OnceLock::new();
static RE_TEMPLATE: OnceLock<Regex> = OnceLock::new();
static RE_JAVA_CONSTANT: OnceLock<Regex> = OnceLock::new();
static RE_VERSION_CALL: OnceLock<Regex> = OnceLock::new();
static RE_PLUGIN_SUFFIX: OnceLock<Regex> = OnceLock::new();
static RE_TASK_NAMED: OnceLock<Regex> = OnceLock::new();
static RE_TASK_TYPE: OnceLock<Regex> = OnceLock::new();
static RE_TASK_ACCESSOR: OnceLock<Regex> = OnceLock::new();

fn re_call_head() -> &'static Regex {
    RE_CALL_HEAD.get_or_init(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*(?:<[^()]*>)?\s*\(").unwrap())
}

fn re_assign() -> &'static Regex {
    RE_ASSIGN.get_or_init(|| Regex::new(r"(?s)^([A-Za-z_][\w.]*)\s*=([^=].*)$").unwrap())
}

fn re_named_arg() -> &'static Regex {
    RE_NAMED_ARG.get_or_init(|| Regex::new(r"(?s)^([A-Za-z_]\w*)\s*[=:]([^:=].*)$").unwrap())
}

fn re_template() -> &'static Regex {
    RE_TEMPLATE.get_or_init(|| Regex::new(r"\$\{(\w+)\}|\$(\w+)").unwrap())
}

fn re_java_constant() -> &'static Regex {
    RE_JAVA_CONSTANT.get_or_init(|| Regex::new(r"(?:VERSION_|JVM_)(\d+(?:_\d+)*)").unwrap())
}

fn re_version_call() -> &'static Regex {
    RE_VERSION_CALL.get_or_init(|| Regex::new(r"(?:\.of|toVersion)\(\s*(.+?)\s*\)$").unwrap())
}

fn re_plugin_suffix() -> &'static Regex {
    RE_PLUGIN_SUFFIX.get_or_init(|| {
        Regex::new(
            r#"^\s*(?:\.?\s*version\s*\(?\s*("[^"]*"|'[^']*'|libs\.versions\.[\w.]+?(?:\.get\(\))?|[\w.]+)\s*\)?)?\s*(?:\.?\s*apply\s*\(?\s*(true|false)\s*\)?)?\s*$"#,
        )
        .unwrap()
    })
}

fn re_task_named() -> &'static Regex {
    RE_TASK_NAMED.get_or_init(|| {
        Regex::new(
            r#"^(?:tasks\.)?(?:named|getByName|register|create)\s*(?:<[^()]*>)?\s*\(\s*["']([^"']+)["']"#,
        )
        .unwrap()
    })
}

fn re_task_type() -> &'static Regex {
    RE_TASK_TYPE.get_or_init(|| {
        Regex::new(r"^(?:tasks\.)?withType\s*(?:<\s*([\w.]+)\s*>|\(\s*([\w.]+))").unwrap()
    })
}

fn re_task_accessor() -> &'static Regex {
    RE_TASK_ACCESSOR.get_or_init(|| Regex::new(r"^tasks\.([A-Za-z_]\w*)$").unwrap())
}

/// Per-dialect syntax.
pub(crate) trait Dialect: Sync {
    const DSL: Dsl;
    const FILE_TYPE: &'static str;

    /// Local variable declaration: `(name, value expression)`.
    fn variable<'s>(&self, code: &'s str) -> Option<(&'s str, &'s str)>;

    /// Call written without parentheses (`implementation 'g:a:v'`).
    fn command<'s>(&self, _code: &'s str) -> Option<Call<'s>> {
        None
    }

    /// One statement of a `plugins { }` block.
    fn plugin(&self, code: &str, vars: &Vars) -> Option<PluginApplication>;
}

/// `name(arg, ..)`, or `name arg, ..` in Groovy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call<'s> {
    pub name: &'s str,
    pub args: Vec<&'s str>,
}

impl<'s> Call<'s> {
    pub fn new(name: &'s str, args: Vec<&'s str>) -> Self {
        Self { name, args }
    }

    /// Value of a named argument (`key = v` or `key: v`).
    pub fn named(&self, key: &str) -> Option<&'s str> {
        self.args.iter().find_map(|&arg| {
            let (name, value) = named_arg(arg)?;
            (name == key).then_some(value)
        })
    }

    pub fn positional(&self) -> impl Iterator<Item = &'s str> + '_ {
        self.args
            .iter()
            .copied()
            .filter(|arg| named_arg(arg).is_none())
    }

    /// Named argument `key`, else the positional argument at `index`.
    pub fn arg(&self, index: usize, key: &str) -> Option<&'s str> {
        self.named(key).or_else(|| self.positional().nth(index))
    }
}

fn named_arg(arg: &str) -> Option<(&str, &str)> {
    let caps = re_named_arg().captures(arg)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
}

/// A statement reduced to what the interpreter acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op<'s> {
    /// `key = value`, `key.set(value)`, or Groovy `key value`.
    Assign(&'s str, &'s str),
    Call(Call<'s>),
}

/// Splits `text` on commas outside strings and brackets.
pub(crate) fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Index of the bracket closing the one at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;

    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses `name(args)` where the closing parenthesis ends the statement.
/// Kotlin type arguments (`create<MavenPublication>("maven")`) are skipped.
pub(crate) fn call(code: &str) -> Option<Call<'_>> {
    let head = re_call_head().captures(code)?;
    let name = head.get(1)?.as_str();
    let open = head.get(0)?.end() - 1;
    let close = matching_close(code, open)?;
    if !code[close + 1..].trim().is_empty() {
        return None;
    }
    Some(Call::new(name, split_top_level(&code[open + 1..close])))
}

pub(crate) fn assignment(code: &str) -> Option<(&str, &str)> {
    let caps = re_assign().captures(code)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
}

fn unquote<'s>(expr: &'s str, quote: &str) -> Option<&'s str> {
    let inner = expr.strip_prefix(quote)?.strip_suffix(quote)?;
    (!inner.contains(quote)).then_some(inner)
}

/// Evaluates a string literal, a known variable, a bare number or a `+`
/// concatenation of those.
///
/// Double-quoted strings get `$name` / `${name}` substitution; unknown
/// names are left as written.
pub(crate) fn string_value(expr: &str, vars: &Vars) -> Option<String> {
    let expr = expr.trim();
    if expr.len() >= 6
        && let Some(inner) = unquote(expr, "\"\"\"")
    {
        return Some(substitute(inner, vars));
    }
    if expr.len() >= 2 {
        if let Some(inner) = unquote(expr, "\"") {
            return Some(substitute(inner, vars));
        }
        if let Some(inner) = unquote(expr, "'") {
            return Some(inner.to_string());
        }
    }
    if let Some(value) = vars.get(expr) {
        return Some(value.clone());
    }
    if !expr.is_empty() && expr.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Some(expr.to_string());
    }
    if let Some(operands) = concat_operands(expr) {
        return operands
            .into_iter()
            .map(|operand| string_value(operand, vars))
            .collect();
    }
    None
}

/// Splits `a + b + c` at `+` signs outside string literals. Expressions with
/// calls are not split.
fn concat_operands(expr: &str) -> Option<Vec<&str>> {
    let mut operands = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | ')') => return None,
            (None, '+') => {
                operands.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if operands.is_empty() {
        return None;
    }
    operands.push(&expr[start..]);
    Some(operands)
}

fn substitute(text: &str, vars: &Vars) -> String {
    re_template()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|name| vars.get(name.as_str()))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Applies the `version ".." apply false` tail of a plugin declaration.
pub(crate) fn with_plugin_suffix(
    mut plugin: PluginApplication,
    suffix: &str,
    vars: &Vars,
) -> Option<PluginApplication> {
    let caps = re_plugin_suffix().captures(suffix)?;
    if let Some(version) = caps.get(1) {
        let version = version.as_str();
        match version.strip_prefix("libs.versions.") {
            Some(accessor) => {
                let accessor = accessor.strip_suffix(".get()").unwrap_or(accessor);
                plugin.version_ref = Some(accessor.to_string());
            }
            None => plugin.version = string_value(version, vars),
        }
    }
    if let Some(apply) = caps.get(2) {
        plugin.apply = apply.as_str() == "true";
    }
    Some(plugin)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskTarget {
    Named(String),
    Type(String),
}

fn task_target(header: &str, in_tasks_block: bool) -> Option<TaskTarget> {
    if let Some(caps) = re_task_type().captures(header) {
        let ty = caps.get(1).or_else(|| caps.get(2))?.as_str();
        let ty = ty.rsplit('.').next().unwrap_or(ty);
        return Some(TaskTarget::Type(ty.to_string()));
    }
    if let Some(caps) = re_task_named().captures(header) {
        return Some(TaskTarget::Named(caps[1].to_string()));
    }
    if let Some(caps) = re_task_accessor().captures(header) {
        return Some(TaskTarget::Named(caps[1].to_string()));
    }
    let identifier = !header.is_empty() && header.chars().all(|c| c.is_alphanumeric() || c == '_');
    if header == "shadowJar" || (in_tasks_block && identifier) {
        return Some(TaskTarget::Named(header.to_string()));
    }
    None
}

enum Notation {
    External(DependencyDeclaration),
    Project(String),
}

fn repository_for(url: String, name: Option<String>) -> Repository {
    let url = if url.ends_with('/') { url } else { format!("{url}/") };
    for known in [Repository::jitpack(), Repository::maven_central()] {
        if known.url == url && name.is_none() {
            return known;
        }
    }
    let name = name.unwrap_or_else(|| {
        let host = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
        host.split('/').next().unwrap_or(host).to_string()
    });
    Repository::new(name, url)
}

fn push_wiring(tasks: &mut Vec<TaskWiring>, task: &str, depends_on: Vec<String>) {
    if let Some(existing) = tasks.iter_mut().find(|t| t.task == task) {
        for dep in depends_on {
            if !existing.depends_on.contains(&dep) {
                existing.depends_on.push(dep);
            }
        }
    } else {
        tasks.push(TaskWiring {
            task: task.to_string(),
            depends_on,
        });
    }
}

/// Gives a module with a shadow plugin applied default shadow options.
fn finish(module: &mut Module) {
    if module.shadow.is_none()
        && module
            .plugins
            .iter()
            .any(|p| p.apply && SHADOW_PLUGINS.contains(&p.id.as_str()))
    {
        module.shadow = Some(ShadowOptions::default());
    }
}

/// A scanned script together with its variables and line table.
pub(crate) struct Script<'a, D> {
    dialect: &'a D,
    content: &'a str,
    lines: LineOffsetTable,
    vars: Vars,
}

impl<'a, D: Dialect> Script<'a, D> {
    pub fn new(dialect: &'a D, content: &'a str, root: &Block) -> Self {
        let mut script = Self {
            dialect,
            content,
            lines: LineOffsetTable::new(content),
            vars: Vars::new(),
        };
        script.collect_variables(root, false);
        script
    }

    fn collect_variables(&mut self, block: &Block, ext: bool) {
        for stmt in &block.statements {
            let declared = self
                .dialect
                .variable(&stmt.code)
                .or_else(|| if ext { assignment(&stmt.code) } else { None });
            if let Some((name, expr)) = declared
                && let Some(value) = string_value(expr, &self.vars)
            {
                self.vars.insert(name.to_string(), value);
            }
        }
        for child in &block.children {
            self.collect_variables(child, child.header == "ext");
        }
    }

    pub fn literal(&self, expr: &str) -> Option<String> {
        string_value(expr, &self.vars)
    }

    pub fn operation<'s>(&self, code: &'s str) -> Option<Op<'s>> {
        if self.dialect.variable(code).is_some() {
            return None;
        }
        if let Some((key, expr)) = assignment(code) {
            return Some(Op::Assign(key, expr));
        }
        let call = call(code).or_else(|| self.dialect.command(code))?;
        if let [arg] = call.args.as_slice()
            && named_arg(arg).is_none()
        {
            if let Some(key) = call.name.strip_suffix(".set") {
                return Some(Op::Assign(key, *arg));
            }
            if PROPERTY_KEYS.contains(&call.name) {
                return Some(Op::Assign(call.name, *arg));
            }
        }
        Some(Op::Call(call))
    }

    fn range(&self, stmt: &Statement) -> Range {
        self.lines.range(self.content, stmt.start, stmt.end)
    }

    fn java_version(&self, expr: &str) -> Option<String> {
        if let Some(caps) = re_java_constant().captures(expr) {
            return Some(caps[1].replace('_', "."));
        }
        if let Some(caps) = re_version_call().captures(expr) {
            return self.literal(&caps[1]);
        }
        self.literal(expr)
    }

    /// Records everything `block` declares on `module`.
    pub fn configure(&self, block: &Block, module: &mut Module, root_level: bool) {
        for stmt in &block.statements {
            self.module_statement(stmt, module);
        }
        for child in &block.children {
            self.module_block(child, module, root_level);
        }
    }

    fn module_statement(&self, stmt: &Statement, module: &mut Module) {
        let Some(op) = self.operation(&stmt.code) else {
            return;
        };
        match op {
            Op::Assign(key, expr) => match key {
                "group" | "project.group" => module.group = self.literal(expr),
                "version" | "project.version" => module.version = self.literal(expr),
                "description" | "project.description" => {
                    module.description = self.literal(expr);
                }
                "mainClass" | "mainClassName" | "application.mainClass" => {
                    module.main_class = self.literal(expr);
                }
                _ => self.compiler_assignment(key, expr, &mut module.compiler),
            },
            Op::Call(call) => match call.name {
                "setupJda" => self.setup_jda(&call, stmt, module),
                "setupPublishing" => self.setup_publishing(&call, module),
                "repository" => module.repositories.extend(self.repository_constants(&call)),
                "apply" => {
                    if let Some(id) = call.named("plugin").and_then(|p| self.literal(p)) {
                        module.plugins.push(PluginApplication::new(id));
                    }
                }
                _ => self.compiler_call(&call, &mut module.compiler),
            },
        }
    }

    fn module_block(&self, block: &Block, module: &mut Module, root_level: bool) {
        match block.header.as_str() {
            "plugins" => self.plugins(block, &mut module.plugins),
            "dependencies" => self.dependencies(block, module),
            "repositories" => module.repositories.extend(self.repositories(block)),
            "publishing" => self.publishing(block, module),
            "application" => {
                for stmt in &block.statements {
                    self.module_statement(stmt, module);
                }
            }
            "tasks" => {
                for task in &block.children {
                    match task_target(&task.header, true) {
                        Some(target) => self.task(&target, task, module),
                        None => self.compiler_block(task, &mut module.compiler),
                    }
                }
            }
            "subprojects" | "allprojects" if root_level => self.shared(block, module),
            "subprojects" | "allprojects" => {
                tracing::debug!("Ignoring nested '{}' block in {}", block.header, module.path);
            }
            "ext" | "buildscript" | "pluginManagement" | "configurations" => {}
            header => match task_target(header, false) {
                Some(target) => self.task(&target, block, module),
                None => self.compiler_block(block, &mut module.compiler),
            },
        }
    }

    fn plugins(&self, block: &Block, plugins: &mut Vec<PluginApplication>) {
        for stmt in &block.statements {
            match self.dialect.plugin(&stmt.code, &self.vars) {
                Some(plugin) => plugins.push(plugin),
                None => tracing::warn!("Unrecognized plugin declaration '{}'", stmt.code),
            }
        }
    }

    fn dependencies(&self, block: &Block, module: &mut Module) {
        for stmt in &block.statements {
            let Some(Op::Call(call)) = self.operation(&stmt.code) else {
                continue;
            };
            let Some(scope) = Scope::from_configuration(call.name) else {
                tracing::debug!("Skipping untracked configuration '{}'", call.name);
                continue;
            };
            match self.notation(scope, &call) {
                Some(Notation::External(mut dep)) => {
                    dep.range = self.range(stmt);
                    dep.comment.clone_from(&stmt.comment);
                    module.dependencies.push(dep);
                }
                Some(Notation::Project(path)) => {
                    module.project_dependencies.push(ProjectDependency {
                        scope,
                        path,
                        range: self.range(stmt),
                    });
                }
                None => tracing::warn!("Unrecognized dependency notation '{}'", stmt.code),
            }
        }
    }

    fn notation(&self, scope: Scope, call: &Call<'_>) -> Option<Notation> {
        if let [single] = call.args.as_slice() {
            if let Some(inner) = self::call(single) {
                return match inner.name {
                    "platform" | "enforcedPlatform" => match self.notation(scope, &inner)? {
                        Notation::External(mut dep) => {
                            dep.platform = true;
                            Some(Notation::External(dep))
                        }
                        project @ Notation::Project(_) => Some(project),
                    },
                    "project" => {
                        let path = inner.arg(0, "path").and_then(|p| self.literal(p))?;
                        Some(Notation::Project(normalize_path(&path)))
                    }
                    "kotlin" => {
                        let name = inner.arg(0, "module").and_then(|m| self.literal(m))?;
                        let mut coordinate =
                            Coordinate::new("org.jetbrains.kotlin", format!("kotlin-{name}"));
                        coordinate.version = inner.arg(1, "version").and_then(|v| self.literal(v));
                        Some(Notation::External(DependencyDeclaration::new(
                            scope, coordinate,
                        )))
                    }
                    _ => None,
                };
            }
            if let Some(alias) = single.strip_prefix("libs.") {
                let alias = alias.strip_suffix(".get()").unwrap_or(alias);
                let mut dep = DependencyDeclaration::new(scope, Coordinate::default());
                dep.catalog_alias = Some(alias.to_string());
                return Some(Notation::External(dep));
            }
            if named_arg(single).is_none() {
                let notation = self.literal(single)?;
                let coordinate = Coordinate::parse(&notation)?;
                return Some(Notation::External(DependencyDeclaration::new(
                    scope, coordinate,
                )));
            }
        }

        let group = call.arg(0, "group").and_then(|g| self.literal(g))?;
        let artifact = call.arg(1, "name").and_then(|a| self.literal(a))?;
        let mut coordinate = Coordinate::new(group, artifact);
        coordinate.version = call.arg(2, "version").and_then(|v| self.literal(v));
        Some(Notation::External(DependencyDeclaration::new(
            scope, coordinate,
        )))
    }

    /// Repository declarations of a `repositories { }` block, in order.
    pub fn repositories(&self, block: &Block) -> Vec<Repository> {
        let mut repos = Vec::new();
        let mut maven_blocks = block.named("maven");

        for stmt in &block.statements {
            if stmt.code == "maven" {
                if let Some(maven) = maven_blocks.next() {
                    repos.extend(self.maven_block(maven));
                }
                continue;
            }
            let Some(Op::Call(call)) = self.operation(&stmt.code) else {
                continue;
            };
            if call.args.is_empty()
                && let Some(repo) = Repository::from_shortcut(call.name)
            {
                repos.push(repo);
            } else if call.name == "maven"
                && let Some(url) = call.arg(0, "url").and_then(|u| self.url(u))
            {
                let name = call.named("name").and_then(|n| self.literal(n));
                repos.push(repository_for(url, name));
            } else {
                tracing::debug!("Unrecognized repository declaration '{}'", stmt.code);
            }
        }
        repos
    }

    fn maven_block(&self, block: &Block) -> Option<Repository> {
        let mut url = None;
        let mut name = None;
        for stmt in &block.statements {
            if let Some(Op::Assign(key, expr)) = self.operation(&stmt.code) {
                match key {
                    "url" => url = self.url(expr),
                    "name" => name = self.literal(expr),
                    _ => {}
                }
            }
        }
        if url.is_none() {
            tracing::debug!("maven {{ }} repository without a url");
        }
        Some(repository_for(url?, name))
    }

    fn url(&self, expr: &str) -> Option<String> {
        match call(expr) {
            Some(inner) if inner.name == "uri" => inner.args.first().and_then(|a| self.literal(a)),
            _ => self.literal(expr),
        }
    }

    fn publishing(&self, block: &Block, module: &mut Module) {
        for publications in block.named("publications") {
            for publication in &publications.children {
                let Some(name) = self.publication_name(&publication.header) else {
                    tracing::debug!("Skipping publication '{}'", publication.header);
                    continue;
                };
                if module.publishing.is_some() {
                    tracing::debug!("Ignoring additional publication '{}'", name);
                    continue;
                }
                module.publishing = Some(self.publication(name, publication));
            }
        }
    }

    /// `create<MavenPublication>("maven")`, `register("maven", MavenPublication)`
    /// or Groovy `maven(MavenPublication)`.
    fn publication_name(&self, header: &str) -> Option<String> {
        if !header.contains("MavenPublication") {
            return None;
        }
        let call = call(header)?;
        match call.name {
            "create" | "register" | "maybeCreate" => call
                .positional()
                .find_map(|arg| string_value(arg, &self.vars).filter(|_| arg.starts_with(['"', '\'']))),
            name => Some(name.to_string()),
        }
    }

    fn publication(&self, name: String, block: &Block) -> PublishingDescriptor {
        let mut descriptor = PublishingDescriptor {
            publication: name,
            ..Default::default()
        };
        for stmt in &block.statements {
            if let Some(Op::Assign(key, expr)) = self.operation(&stmt.code) {
                match key {
                    "groupId" => descriptor.group_id = self.literal(expr),
                    "artifactId" => descriptor.artifact_id = self.literal(expr),
                    _ => {}
                }
            }
        }
        for pom in block.named("pom") {
            self.pom(pom, &mut descriptor);
        }
        descriptor
    }

    fn pom(&self, block: &Block, descriptor: &mut PublishingDescriptor) {
        if let Some(url) = self.properties(block).remove("url") {
            descriptor.url = Some(url);
        }
        for licenses in block.named("licenses") {
            for license in licenses.named("license") {
                let mut props = self.properties(license);
                match props.remove("name") {
                    Some(name) => descriptor.licenses.push(License {
                        name,
                        url: props.remove("url"),
                    }),
                    None => tracing::debug!("pom license without a name"),
                }
            }
        }
        for developers in block.named("developers") {
            for developer in developers.named("developer") {
                let mut props = self.properties(developer);
                let name = props.remove("name");
                let Some(id) = props.remove("id").or_else(|| name.clone()) else {
                    tracing::debug!("pom developer without an id or name");
                    continue;
                };
                descriptor.developers.push(Developer {
                    id,
                    name,
                    email: props.remove("email"),
                    url: props.remove("url"),
                });
            }
        }
    }

    fn properties(&self, block: &Block) -> HashMap<String, String> {
        block
            .statements
            .iter()
            .filter_map(|stmt| match self.operation(&stmt.code)? {
                Op::Assign(key, expr) => Some((key.to_string(), self.literal(expr)?)),
                Op::Call(_) => None,
            })
            .collect()
    }

    fn task(&self, target: &TaskTarget, block: &Block, module: &mut Module) {
        let shadow = match target {
            TaskTarget::Named(name) => name == "shadowJar",
            TaskTarget::Type(ty) => ty == "ShadowJar",
        };
        if shadow {
            self.shadow(block, module.shadow.get_or_insert_with(ShadowOptions::default));
        } else {
            self.compiler_block(block, &mut module.compiler);
        }
        if let TaskTarget::Named(name) = target {
            let depends_on = self.depends_on(block);
            if !depends_on.is_empty() {
                push_wiring(&mut module.tasks, name, depends_on);
            }
        }
    }

    fn depends_on(&self, block: &Block) -> Vec<String> {
        let mut tasks = Vec::new();
        for stmt in &block.statements {
            let Some(Op::Call(call)) = self.operation(&stmt.code) else {
                continue;
            };
            if call.name != "dependsOn" {
                continue;
            }
            for arg in &call.args {
                match self.task_reference(arg) {
                    Some(task) => tasks.push(task),
                    None => tracing::debug!("Unrecognized task reference '{}'", arg),
                }
            }
        }
        tasks
    }

    fn task_reference(&self, arg: &str) -> Option<String> {
        if let Some(name) = self.literal(arg) {
            return Some(name);
        }
        match task_target(arg, true)? {
            TaskTarget::Named(name) => Some(name),
            TaskTarget::Type(_) => None,
        }
    }

    fn shadow(&self, block: &Block, shadow: &mut ShadowOptions) {
        for stmt in &block.statements {
            match self.operation(&stmt.code) {
                Some(Op::Call(call)) => match call.name {
                    "mergeServiceFiles" => shadow.merge_service_files = true,
                    "minimize" => shadow.minimize = true,
                    "relocate" => {
                        let mut args = call.positional().map(|a| self.literal(a));
                        if let (Some(Some(from)), Some(Some(to))) = (args.next(), args.next()) {
                            shadow.relocations.push(Relocation { from, to });
                        }
                    }
                    _ => {}
                },
                Some(Op::Assign("archiveClassifier" | "classifier", expr)) => {
                    shadow.archive_classifier = self.literal(expr);
                }
                Some(Op::Assign(..)) => {}
                None => match stmt.code.as_str() {
                    "mergeServiceFiles" => shadow.merge_service_files = true,
                    "minimize" => shadow.minimize = true,
                    _ => {}
                },
            }
        }
    }

    fn compiler_block(&self, block: &Block, compiler: &mut CompilerOptions) {
        for stmt in &block.statements {
            match self.operation(&stmt.code) {
                Some(Op::Assign(key, expr)) => self.compiler_assignment(key, expr, compiler),
                Some(Op::Call(call)) => self.compiler_call(&call, compiler),
                None => {}
            }
        }
        for child in &block.children {
            self.compiler_block(child, compiler);
        }
    }

    fn compiler_assignment(&self, key: &str, expr: &str, compiler: &mut CompilerOptions) {
        let last = key.rsplit('.').next().unwrap_or(key);
        match last {
            "languageVersion" | "sourceCompatibility" | "release" => {
                if let Some(version) = self.java_version(expr) {
                    compiler.java_version = Some(version);
                }
            }
            "targetCompatibility" => {
                if compiler.java_version.is_none() {
                    compiler.java_version = self.java_version(expr);
                }
            }
            "jvmTarget" => compiler.kotlin_jvm_target = self.java_version(expr),
            "encoding" => compiler.encoding = self.literal(expr),
            _ => {}
        }
    }

    fn compiler_call(&self, call: &Call<'_>, compiler: &mut CompilerOptions) {
        let last = call.name.rsplit('.').next().unwrap_or(call.name);
        match last {
            "withJavadocJar" => compiler.javadoc_jar = Some(true),
            "withSourcesJar" => compiler.sources_jar = Some(true),
            "jvmToolchain" | "setLanguageVersion" => {
                if let Some(version) = call.args.first().and_then(|a| self.java_version(a)) {
                    compiler.java_version = Some(version);
                }
            }
            _ => {}
        }
    }

    fn shared(&self, block: &Block, module: &mut Module) {
        let target = if block.header == "subprojects" {
            SharedTarget::Subprojects
        } else {
            SharedTarget::Allprojects
        };
        let mut scratch = Module::new(module.path.clone(), module.name.clone());
        self.configure(block, &mut scratch, false);
        finish(&mut scratch);
        if !scratch.project_dependencies.is_empty() {
            tracing::debug!(
                "Ignoring {} project dependencies in '{}' block",
                scratch.project_dependencies.len(),
                block.header
            );
        }
        module.shared.push(SharedDefaults {
            target,
            group: scratch.group,
            version: scratch.version,
            plugins: scratch.plugins,
            repositories: scratch.repositories,
            dependencies: scratch.dependencies,
            compiler: scratch.compiler,
            shadow: scratch.shadow,
        });
    }

    /// `setupJda(jdaVersion, group, version, description, javaVersion)`.
    fn setup_jda(&self, call: &Call<'_>, stmt: &Statement, module: &mut Module) {
        let text = |index, key| call.arg(index, key).and_then(|a| self.literal(a));
        JdaSetup {
            jda_version: text(0, "jdaVersion"),
            group: text(1, "group"),
            version: text(2, "version"),
            description: text(3, "description"),
            java_version: call
                .arg(4, "javaVersion")
                .and_then(|a| self.java_version(a)),
        }
        .apply(module);
        if let Some(dep) = module.dependencies.last_mut() {
            dep.range = self.range(stmt);
        }
    }

    fn setup_publishing(&self, call: &Call<'_>, module: &mut Module) {
        let text = |key| call.named(key).and_then(|a| self.literal(a));
        let descriptor = PublishingDescriptor {
            publication: "maven".to_string(),
            group_id: text("groupId"),
            artifact_id: text("artifactId"),
            url: text("url"),
            licenses: call
                .named("licenses")
                .map(|expr| constants(expr, "LicenseData"))
                .unwrap_or_default()
                .into_iter()
                .map(conventions::license)
                .collect(),
            developers: call
                .named("developers")
                .map(|expr| constants(expr, "DeveloperData"))
                .unwrap_or_default()
                .into_iter()
                .map(conventions::developer)
                .collect(),
        };
        conventions::apply_publishing(module, descriptor);
    }

    fn repository_constants(&self, call: &Call<'_>) -> Vec<Repository> {
        call.positional()
            .flat_map(|arg| constants(arg, "Repository"))
            .filter_map(|constant| {
                let repo = conventions::repository(constant);
                if repo.is_none() {
                    tracing::warn!("Unknown repository constant 'Repository.{}'", constant);
                }
                repo
            })
            .collect()
    }
}

/// `listOf(Prefix.A, Prefix.B)` or `Prefix.A` -> `["A", "B"]`.
fn constants<'s>(expr: &'s str, prefix: &str) -> Vec<&'s str> {
    let items = match call(expr) {
        Some(list) if matches!(list.name, "listOf" | "setOf" | "arrayOf" | "mutableListOf") => {
            list.args
        }
        _ => vec![expr.trim()],
    };
    items
        .into_iter()
        .filter_map(|item| item.strip_prefix(prefix)?.strip_prefix('.'))
        .collect()
}

/// Parses a build script and records its declarations on `module`.
pub(crate) fn parse_build_script<D: Dialect>(
    dialect: &D,
    content: &str,
    module: &mut Module,
) -> Result<()> {
    let root = scan(content)?;
    let script = Script::new(dialect, content, &root);
    module.dsl = D::DSL;
    script.configure(&root, module, true);
    finish(module);

    tracing::debug!(
        "Parsed {} for {}: {} plugins, {} dependencies, {} project dependencies",
        D::FILE_TYPE,
        module.path,
        module.plugins.len(),
        module.dependencies.len(),
        module.project_dependencies.len()
    );
    Ok(())
}
