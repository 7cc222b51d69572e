//! Command-line interface for lazybuild.
//!
//! `lazybuild` reads a multi-module Gradle build statically and reports on
//! it: the module list, the resolved module graph after root defaults are
//! applied, structural checks and (with the `maven` feature) the POM each
//! published module would ship with.

pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};
use commands::{CheckArgs, ModulesArgs, ResolveArgs, Status};
use config::LazybuildConfig;
use lazybuild_core::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "lazybuild",
    author,
    version,
    about = "Inspect, resolve and check a multi-module Gradle build without running Gradle"
)]
pub struct Cli {
    /// Configuration file (default: lazybuild.toml in the build root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Modules(ModulesArgs),
    Resolve(ResolveArgs),
    Check(CheckArgs),
    #[cfg(feature = "maven")]
    Pom(commands::PomArgs),
}

impl Command {
    /// Build root the command operates on.
    pub fn dir(&self) -> &Path {
        match self {
            Self::Modules(args) => &args.dir,
            Self::Resolve(args) => &args.dir,
            Self::Check(args) => &args.dir,
            #[cfg(feature = "maven")]
            Self::Pom(args) => &args.dir,
        }
    }
}

/// Loads configuration and runs the selected command, writing its report to
/// `out`.
pub async fn run(cli: &Cli, out: &mut impl Write) -> Result<Status> {
    let config = LazybuildConfig::load(cli.config.as_deref(), cli.command.dir()).await?;

    match &cli.command {
        Command::Modules(args) => commands::handle_modules(args, &config, out).await,
        Command::Resolve(args) => commands::handle_resolve(args, &config, out).await,
        Command::Check(args) => commands::handle_check(args, &config, out).await,
        #[cfg(feature = "maven")]
        Command::Pom(args) => commands::handle_pom(args, &config, out).await,
    }
}
