use crate::error::Result;
use crate::module::Module;
use std::path::Path;

/// Build script parser interface.
///
/// Implementors read one script format (Kotlin DSL, Groovy DSL) and record
/// what it declares on the module being configured.
pub trait BuildScriptParser: Send + Sync {
    /// Human-readable format name used in error messages.
    fn file_type(&self) -> &'static str;

    /// Whether this parser understands the given build file name.
    fn handles(&self, file_name: &str) -> bool;

    /// Parses `content` and records its declarations on `module`.
    ///
    /// # Errors
    ///
    /// Returns error if the script structure is unreadable (unbalanced
    /// braces, unterminated strings).
    fn parse(&self, content: &str, path: &Path, module: &mut Module) -> Result<()>;
}

/// Picks the parser for `file_name` from `parsers`.
pub fn parser_for<'a>(
    parsers: &'a [&'a dyn BuildScriptParser],
    file_name: &str,
) -> Option<&'a dyn BuildScriptParser> {
    parsers.iter().copied().find(|p| p.handles(file_name))
}
