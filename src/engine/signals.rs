// src/engine/signals.rs

//! Termination signal handling.
//!
//! On Unix SIGINT, SIGTERM and SIGQUIT end a develop session; elsewhere only
//! Ctrl-C does. The first signal is turned into a
//! `RuntimeEvent::ShutdownRequested`; once the handlers are installed later
//! signals no longer kill the process, so teardown can finish.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::engine::{RuntimeEvent, ShutdownReason};

#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Forward the first termination signal to the runtime.
pub fn spawn_signal_listener(events: mpsc::Sender<RuntimeEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = match wait_for_shutdown_signal().await {
            Ok(()) => {
                info!("termination signal received");
                ShutdownReason::Signal
            }
            Err(e) => {
                warn!(error = %e, "could not listen for termination signals");
                return;
            }
        };

        let _ = events
            .send(RuntimeEvent::ShutdownRequested { reason })
            .await;
    })
}
