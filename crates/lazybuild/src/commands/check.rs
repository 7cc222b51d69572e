use super::{Status, load, stdout_error, write_json};
use crate::config::LazybuildConfig;
use clap::Args;
use lazybuild_core::{Result, validate};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(about = "Check the build for structural problems")]
pub struct CheckArgs {
    /// Build root directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Fail on warnings as well as errors
    #[arg(long)]
    pub deny_warnings: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle_check(
    args: &CheckArgs,
    config: &LazybuildConfig,
    out: &mut impl Write,
) -> Result<Status> {
    let set = load(&args.dir, config).await?;

    let mut validation = config.validation.clone();
    validation.deny_warnings |= args.deny_warnings;
    let report = validate(&set, &validation);

    if args.json {
        write_json(out, &report, config.output.pretty)?;
    } else {
        for violation in &report.violations {
            writeln!(out, "{violation}").map_err(stdout_error)?;
        }
        writeln!(
            out,
            "{} modules checked: {} errors, {} warnings",
            set.len(),
            report.errors().count(),
            report.warnings().count()
        )
        .map_err(stdout_error)?;
    }

    if report.passed() {
        Ok(Status::Success)
    } else {
        tracing::debug!("Check failed for {:?}", args.dir);
        Ok(Status::ChecksFailed)
    }
}
