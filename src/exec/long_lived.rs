// src/exec/long_lived.rs

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::{MonodevError, Result};
use crate::exec::process::{forward_stderr, forward_stdout, shell_command};
use crate::plugin::{DevelopInstance, PluginFuture};

/// When a long-lived child counts as started.
///
/// With neither field set the child is ready as soon as it has been spawned.
/// With both set, whichever happens first wins.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    /// A stdout line matching this regex marks the child ready.
    pub on_stdout: Option<Regex>,
    /// The child is ready after running for this long.
    pub after: Option<Duration>,
}

impl Readiness {
    fn is_immediate(&self) -> bool {
        self.on_stdout.is_none() && self.after.is_none()
    }
}

/// Handle to a running child process.
///
/// The child is owned by a supervisor task; [`ChildInstance::kill`] asks it
/// to kill the process and waits until it has exited.
#[derive(Debug)]
pub struct ChildInstance {
    label: String,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl ChildInstance {
    /// Whether the process is still running.
    pub fn is_running(&self) -> bool {
        self.supervisor
            .lock()
            .map(|s| s.as_ref().map(|h| !h.is_finished()).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Kill the process and wait for it. Killing twice is fine.
    pub async fn kill_child(&self) -> Result<()> {
        let cancel = self.cancel.lock().ok().and_then(|mut c| c.take());
        let supervisor = self.supervisor.lock().ok().and_then(|mut s| s.take());

        if let Some(cancel) = cancel {
            // The supervisor may already be gone if the process exited.
            let _ = cancel.send(());
        }

        if let Some(supervisor) = supervisor {
            supervisor.await.map_err(|e| {
                MonodevError::package(&self.label, format!("process supervisor failed: {e}"))
            })?;
        }
        Ok(())
    }
}

impl DevelopInstance for ChildInstance {
    fn kill(&self) -> PluginFuture<'_, ()> {
        Box::pin(self.kill_child())
    }
}

/// Spawn `cmd` as a long-lived child of `label` and wait until it is ready.
///
/// Fails if the process cannot be spawned or exits before becoming ready.
pub async fn spawn_long_lived(
    label: &str,
    cmd: &str,
    cwd: &Path,
    readiness: Readiness,
) -> Result<ChildInstance> {
    info!(package = %label, cmd = %cmd, "starting long-lived process");

    let mut child = shell_command(cmd, cwd)
        .spawn()
        .with_context(|| format!("spawning `{cmd}` for '{label}'"))?;

    let (ready_tx, ready_rx) = oneshot::channel::<()>();
    if let Some(stdout) = child.stdout.take() {
        match readiness.on_stdout.clone() {
            Some(pattern) => spawn_stdout_monitor(label, stdout, pattern, ready_tx),
            None => {
                forward_stdout(label, stdout);
            }
        }
    }
    if let Some(stderr) = child.stderr.take() {
        forward_stderr(label, stderr);
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let (exited_tx, exited_rx) = oneshot::channel::<i32>();
    let supervisor = tokio::spawn(supervise(label.to_string(), child, cancel_rx, exited_tx));

    let instance = ChildInstance {
        label: label.to_string(),
        cancel: Mutex::new(Some(cancel_tx)),
        supervisor: Mutex::new(Some(supervisor)),
    };

    if readiness.is_immediate() {
        return Ok(instance);
    }

    let ready_after = async {
        match readiness.after {
            Some(duration) => sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    let ready_on_stdout = async {
        // A dropped sender means stdout closed without a match.
        if ready_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ready_after => {
            debug!(package = %label, "ready after delay");
            Ok(instance)
        }
        _ = ready_on_stdout => {
            debug!(package = %label, "ready on stdout");
            Ok(instance)
        }
        code = exited_rx => {
            let code = code.unwrap_or(-1);
            Err(MonodevError::package(
                label,
                format!("`{cmd}` exited with status {code} before becoming ready"),
            ))
        }
    }
}

/// Own the child until it exits or a kill is requested.
async fn supervise(
    label: String,
    mut child: Child,
    cancel_rx: oneshot::Receiver<()>,
    exited_tx: oneshot::Sender<i32>,
) {
    tokio::select! {
        status = child.wait() => {
            let code = status.ok().and_then(|s| s.code()).unwrap_or(-1);
            warn!(package = %label, exit_code = code, "long-lived process exited");
            let _ = exited_tx.send(code);
        }
        cancel = cancel_rx => {
            if cancel.is_err() {
                // Handle dropped; kill_on_drop takes care of the child.
                debug!(package = %label, "process handle dropped");
            }
            info!(package = %label, "killing long-lived process");
            if let Err(e) = child.kill().await {
                warn!(package = %label, error = %e, "failed to kill child process");
            }
        }
    }
}

/// Forward stdout lines and signal readiness on the first line matching
/// `pattern`.
fn spawn_stdout_monitor(
    label: &str,
    stdout: ChildStdout,
    pattern: Regex,
    ready_tx: oneshot::Sender<()>,
) {
    let label = label.to_string();
    tokio::spawn(async move {
        let mut ready_tx = Some(ready_tx);
        let mut lines = BufReader::new(stdout).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            info!(package = %label, "{}", line);

            if ready_tx.is_some() && pattern.is_match(&line) {
                if let Some(tx) = ready_tx.take() {
                    let _ = tx.send(());
                }
            }
        }
    });
}
