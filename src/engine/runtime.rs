// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::backend::ConductorBackend;
use crate::engine::core::CoreRuntime;
use crate::engine::{CoreCommand, CoreStep, RuntimeEvent, ShutdownReason};
use crate::errors::Result;

/// Why [`Runtime::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeExit {
    /// `--once` mode and everything has been processed.
    Idle,
    /// A shutdown was requested.
    Shutdown(ShutdownReason),
    /// Every event sender was dropped.
    ChannelClosed,
}

/// Drives the scheduling queue in response to `RuntimeEvent`s, and delegates
/// the actual develop runs to a `ConductorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// scheduling semantics. Queue mutation only ever happens inside
/// `CoreRuntime::step`, which never awaits.
pub struct Runtime<B: ConductorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: ConductorBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: ConductorBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    pub fn core(&self) -> &CoreRuntime {
        &self.core
    }

    /// Give back the backend, e.g. to stop all conductors during shutdown.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Main event loop.
    ///
    /// - Dispatches whatever the queue was seeded with.
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core.
    pub async fn run(&mut self) -> Result<RuntimeExit> {
        info!("develop runtime started");

        let step = self.core.start();
        if !self.execute_step(step).await? {
            return Ok(RuntimeExit::Idle);
        }

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                return Ok(RuntimeExit::ChannelClosed);
            };

            debug!(?event, "runtime received event");

            let shutdown = match &event {
                RuntimeEvent::ShutdownRequested { reason } => Some(reason.clone()),
                _ => None,
            };

            let step = self.core.step(event);
            let keep_running = self.execute_step(step).await?;

            if let Some(reason) = shutdown {
                info!(?reason, "shutdown requested; stopping runtime");
                return Ok(RuntimeExit::Shutdown(reason));
            }
            if !keep_running {
                info!("core requested exit; stopping runtime");
                return Ok(RuntimeExit::Idle);
            }
        }
    }

    /// Execute the commands of one step. Returns `keep_running`.
    async fn execute_step(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            match command {
                CoreCommand::Dispatch(item) => {
                    debug!(package = %item.package, reason = %item.reason, "dispatching");
                    self.backend.dispatch(item).await?;
                }
                CoreCommand::RequestExit => {
                    info!("core issued RequestExit command");
                }
            }
        }
        Ok(step.keep_running)
    }
}
