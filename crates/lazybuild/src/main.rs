use clap::Parser;
use lazybuild::Cli;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for failures to load, resolve or render the build.
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let mut stdout = std::io::stdout().lock();
    match lazybuild::run(&cli, &mut stdout).await {
        Ok(status) => status.into(),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
