//! Subcommand implementations.
//!
//! Each command writes its report to the given writer and returns a
//! [`Status`]; failures to load or resolve the build are returned as errors.

mod check;
mod modules;
#[cfg(feature = "maven")]
mod pom;
mod resolve;

pub use check::{CheckArgs, handle_check};
pub use modules::{ModulesArgs, handle_modules};
#[cfg(feature = "maven")]
pub use pom::{PomArgs, handle_pom};
pub use resolve::{ResolveArgs, handle_resolve};

use crate::config::LazybuildConfig;
use lazybuild_core::{BuildDescriptorSet, LazybuildError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// `check` found violations that fail the build.
    ChecksFailed,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => Self::SUCCESS,
            Status::ChecksFailed => Self::FAILURE,
        }
    }
}

pub(crate) async fn load(dir: &Path, config: &LazybuildConfig) -> Result<BuildDescriptorSet> {
    lazybuild_gradle::load_build(dir, &config.loader.options()).await
}

pub(crate) fn write_json<T: Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out).map_err(stdout_error)
}

pub(crate) fn stdout_error(e: std::io::Error) -> LazybuildError {
    LazybuildError::io("<stdout>", e)
}
