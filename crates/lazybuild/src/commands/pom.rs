use super::{Status, load, stdout_error};
use crate::config::LazybuildConfig;
use clap::Args;
use lazybuild_core::module::normalize_path;
use lazybuild_core::{LazybuildError, Result, resolve};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(about = "Print the pom.xml of a published module")]
pub struct PomArgs {
    /// Build root directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Module to render (`:` for the root project)
    #[arg(short, long)]
    pub module: String,
}

pub async fn handle_pom(
    args: &PomArgs,
    config: &LazybuildConfig,
    out: &mut impl Write,
) -> Result<Status> {
    let set = load(&args.dir, config).await?;
    let resolved = resolve(&set)?;
    let pom = lazybuild_maven::render_pom(&resolved, &normalize_path(&args.module))
        .map_err(LazybuildError::from)?;
    out.write_all(pom.as_bytes()).map_err(stdout_error)?;
    Ok(Status::Success)
}
