// src/exec/process.rs

use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, info};

use crate::errors::{MonodevError, Result};

/// Build a shell command appropriate for the platform, running in `cwd`.
pub fn shell_command(cmd: &str, cwd: &Path) -> Command {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Run `cmd` through the shell and wait for it.
///
/// `label` is the package (or hook) the command belongs to; output lines are
/// logged under it. A non-zero exit status is an error.
pub async fn run_to_completion(label: &str, cmd: &str, cwd: &Path) -> Result<()> {
    info!(package = %label, cmd = %cmd, "running command");

    let mut child = shell_command(cmd, cwd)
        .spawn()
        .with_context(|| format!("spawning `{cmd}` for '{label}'"))?;

    let stdout_task = child.stdout.take().map(|out| forward_stdout(label, out));
    let stderr_task = child.stderr.take().map(|err| forward_stderr(label, err));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{cmd}` of '{label}'"))?;

    // Drain remaining output before reporting.
    for task in [stdout_task, stderr_task].into_iter().flatten() {
        let _ = task.await;
    }

    let code = status.code().unwrap_or(-1);
    debug!(package = %label, exit_code = code, success = status.success(), "command exited");

    if status.success() {
        Ok(())
    } else {
        Err(MonodevError::package(
            label,
            format!("`{cmd}` exited with status {code}"),
        ))
    }
}

/// Log every stdout line at info.
pub(crate) fn forward_stdout(label: &str, stdout: ChildStdout) -> tokio::task::JoinHandle<()> {
    let label = label.to_string();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(package = %label, "{}", line);
        }
    })
}

/// Always consume stderr so buffers don't fill; log at debug.
pub(crate) fn forward_stderr(label: &str, stderr: ChildStderr) -> tokio::task::JoinHandle<()> {
    let label = label.to_string();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(package = %label, "stderr: {}", line);
        }
    })
}
