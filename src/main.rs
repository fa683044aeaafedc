//! Buildpack Packager
//!
//! CLI entry point: package the buildpack in the current directory.

use buildpack_packager::cli::Cli;
use buildpack_packager::config::{init_logging, Settings};
use buildpack_packager::error::PackagerResult;
use buildpack_packager::package::DefaultPackager;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PackagerResult<()> {
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    init_logging(&settings);
    debug!("Buildpack root: {}", settings.root().display());

    let packager = DefaultPackager::from_settings(&settings).await?;
    packager.create(cli.output.as_deref()).await?;

    Ok(())
}
