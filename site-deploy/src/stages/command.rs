use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::StageError;

/// Runs `command_line` through `sh -c` inside `cwd`
pub(crate) async fn run_shell(command_line: &str, cwd: &Path) -> Result<(), StageError> {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);

    run(command, command_line, cwd).await
}

/// Runs a prepared command, inheriting stdout and stderr
pub(crate) async fn run(
    mut command: Command,
    display: &str,
    cwd: &Path,
) -> Result<(), StageError> {
    let command_line = display;
    debug!(command = command_line, cwd = %cwd.display(), "Running command");

    let status = command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(StageError::CommandFailed {
            command: display.to_string(),
            exit_code: status.code(),
        })
    }
}
