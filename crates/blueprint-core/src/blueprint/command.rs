//! Shell commands for post-apply hooks (formatters, package installs, ...)

use crate::error::BlueprintError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `cmd` through `sh -c` in `cwd`
///
/// With a `limit`, the process is killed once it runs longer than that.
/// A non-zero exit status is an error carrying the command's stderr.
pub async fn execute_command(
    cwd: &Path,
    cmd: &str,
    limit: Option<Duration>,
) -> Result<CommandOutput, BlueprintError> {
    tracing::debug!(cwd = %cwd.display(), cmd, "executing command");

    let child = TokioCommand::new("sh")
        .arg("-c")
        .arg(cmd)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match limit {
        Some(limit) => match timeout(limit, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(anyhow::anyhow!(
                    "Command timed out after {}ms: {}",
                    limit.as_millis(),
                    cmd
                )
                .into());
            }
        },
        None => child.wait_with_output().await?,
    };

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "Command failed with exit code {}: {}\n{}",
            output.status.code().unwrap_or(-1),
            cmd,
            result.stderr.trim()
        )
        .into());
    }

    Ok(result)
}
