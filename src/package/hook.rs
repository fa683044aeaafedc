//! Pre-package hook
//!
//! Buildpacks can declare a command in `metadata.pre_package` that prepares
//! files (compiling binaries, fetching resources) before they are archived.

use crate::error::{PackagerError, PackagerResult};
use crate::ui::Logger;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Run the pre-package command, if any, from the buildpack root.
///
/// Output goes straight to this process's stdout and stderr. A missing
/// command is a no-op.
pub async fn run_pre_package(
    root: &Path,
    command: Option<&str>,
    logger: &impl Logger,
) -> PackagerResult<()> {
    let Some(command) = command else {
        debug!("No pre-package command declared");
        return Ok(());
    };

    let program = resolve_program(root, command);
    logger.first_line(&format!("Pre-Package with {}", program.display()));

    let status = Command::new(&program)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| PackagerError::command_failed(command, e))?;

    debug!("Pre-package command exited with {}", status);

    if status.success() {
        Ok(())
    } else {
        Err(PackagerError::HookFailed {
            command: command.to_string(),
            code: status.code(),
        })
    }
}

/// Relative commands with a path separator are relative to the buildpack
/// root; bare names are looked up on `PATH`.
fn resolve_program(root: &Path, command: &str) -> PathBuf {
    let path = Path::new(command);
    if path.is_relative() && path.components().count() > 1 {
        root.join(path)
    } else {
        path.to_path_buf()
    }
}
