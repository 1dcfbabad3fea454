// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated scheduling queue
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from channels and handing dispatched items to the conductors.
//!
//! The core is intended to be unit tested without any Tokio, channels,
//! filesystem, or processes.

use crate::engine::event_handlers::{
    CoreCommand, CoreStep, dispatch_next, handle_package_changed, handle_run_settled,
};
use crate::engine::queue::SchedulingQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    queue: SchedulingQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(queue: SchedulingQueue, options: RuntimeOptions) -> Self {
        Self { queue, options }
    }

    pub fn queue(&self) -> &SchedulingQueue {
        &self.queue
    }

    /// Kick off the drain loop over whatever the queue was seeded with.
    pub fn start(&mut self) -> CoreStep {
        if let Some(command) = dispatch_next(&mut self.queue) {
            return CoreStep {
                commands: vec![command],
                keep_running: true,
            };
        }

        if self.options.exit_when_idle {
            return CoreStep {
                commands: vec![CoreCommand::RequestExit],
                keep_running: false,
            };
        }

        CoreStep {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::PackageChanged { package } => {
                handle_package_changed(&mut self.queue, package)
            }
            RuntimeEvent::RunSettled { package, outcome } => {
                handle_run_settled(&mut self.queue, &self.options, package, outcome)
            }
            RuntimeEvent::ShutdownRequested { .. } => CoreStep::stop(),
        }
    }
}
