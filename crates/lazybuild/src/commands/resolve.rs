use super::{Status, load, write_json};
use crate::config::LazybuildConfig;
use clap::Args;
use lazybuild_core::module::normalize_path;
use lazybuild_core::{Result, resolve};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(about = "Print the resolved module graph as JSON")]
pub struct ResolveArgs {
    /// Build root directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Only print this module (`:library` or `library`)
    #[arg(short, long)]
    pub module: Option<String>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

pub async fn handle_resolve(
    args: &ResolveArgs,
    config: &LazybuildConfig,
    out: &mut impl Write,
) -> Result<Status> {
    let set = load(&args.dir, config).await?;
    let resolved = resolve(&set)?;
    let pretty = config.output.pretty && !args.compact;

    match &args.module {
        Some(path) => write_json(out, resolved.module(&normalize_path(path))?, pretty)?,
        None => write_json(out, &resolved, pretty)?,
    }
    Ok(Status::Success)
}
