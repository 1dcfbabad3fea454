// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{error, info};

use crate::engine::queue::SchedulingQueue;
use crate::engine::{PackageName, QueueItem, RunOutcome, RunReason, RuntimeOptions};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand this item to the package's conductor.
    Dispatch(QueueItem),
    /// Request that the runtime exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn stop() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: false,
        }
    }
}

/// Handle a source change of `package`.
///
/// Queues the package and kicks the drain loop if nothing is processing.
/// While something is processing, the settle of that run picks it up.
pub fn handle_package_changed(queue: &mut SchedulingQueue, package: PackageName) -> CoreStep {
    queue.queue_for_processing(&package, RunReason::SelfChanged, None);

    let mut commands = Vec::new();
    if !queue.is_busy() {
        commands.extend(dispatch_next(queue));
    }

    CoreStep {
        commands,
        keep_running: true,
    }
}

/// Handle a finished conductor run.
///
/// Success propagates to direct dependants; success or failure, the next
/// backlog item is dispatched.
pub fn handle_run_settled(
    queue: &mut SchedulingQueue,
    options: &RuntimeOptions,
    package: PackageName,
    outcome: RunOutcome,
) -> CoreStep {
    match &outcome {
        RunOutcome::Success => info!(package = %package, "package processed"),
        RunOutcome::Failed(message) => {
            error!(package = %package, error = %message, "package failed")
        }
    }

    queue.settle(&package, &outcome);

    let mut commands: Vec<CoreCommand> = dispatch_next(queue).into_iter().collect();
    let mut keep_running = true;

    // In `--once` mode, exit when nothing is processing and nothing waits.
    if options.exit_when_idle && queue.is_idle() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

/// Pop the next backlog item, if any, as a dispatch command.
pub fn dispatch_next(queue: &mut SchedulingQueue) -> Option<CoreCommand> {
    queue.process_next().map(CoreCommand::Dispatch)
}
