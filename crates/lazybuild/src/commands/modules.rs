use super::{Status, load, stdout_error};
use crate::config::LazybuildConfig;
use clap::Args;
use lazybuild_core::{Dsl, Result};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(about = "List the modules of a build")]
pub struct ModulesArgs {
    /// Build root directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

/// Prints one line per module: path, script dialect, plugin and dependency
/// counts as declared (before root defaults are applied).
pub async fn handle_modules(
    args: &ModulesArgs,
    config: &LazybuildConfig,
    out: &mut impl Write,
) -> Result<Status> {
    let set = load(&args.dir, config).await?;
    let width = set.modules.keys().map(String::len).max().unwrap_or(0);

    writeln!(out, "{} ({} modules)", set.root_name, set.len()).map_err(stdout_error)?;
    for module in set.modules.values() {
        let dsl = match (&module.build_file, module.dsl) {
            (None, _) => "-",
            (Some(_), Dsl::Kotlin) => "kotlin",
            (Some(_), Dsl::Groovy) => "groovy",
        };
        let dependencies = module.dependencies.len() + module.project_dependencies.len();
        writeln!(
            out,
            "  {:<width$}  {:<6}  {} plugins  {} dependencies",
            module.path,
            dsl,
            module.plugins.len(),
            dependencies,
        )
        .map_err(stdout_error)?;
    }
    Ok(Status::Success)
}
