// src/engine/mod.rs

//! Development-mode orchestration engine.
//!
//! This module ties together:
//! - the scheduling queue (frontier backlog + single-flight processing)
//! - the per-package conductors that own running develop instances
//! - the runtime event loop that reacts to:
//!   - source changes reported by watchers
//!   - settled conductor runs
//!   - shutdown requests
//! - the graceful shutdown manager
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::fmt;

/// Canonical package name type used throughout the engine.
pub type PackageName = String;

/// Why a package is (re)processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunReason {
    /// Initial processing when the develop session starts.
    FirstRun,
    /// The package's own sources changed.
    SelfChanged,
    /// A dependency finished processing successfully.
    DependencyChanged,
}

impl RunReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunReason::FirstRun => "first run",
            RunReason::SelfChanged => "self changed",
            RunReason::DependencyChanged => "dependency changed",
        }
    }
}

impl fmt::Display for RunReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a conductor run as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

/// A pending unit of work in the scheduling backlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub package: PackageName,
    pub reason: RunReason,
    /// Only set for [`RunReason::DependencyChanged`].
    pub changed_dependency: Option<PackageName>,
}

impl QueueItem {
    pub fn first_run(package: impl Into<PackageName>) -> Self {
        Self {
            package: package.into(),
            reason: RunReason::FirstRun,
            changed_dependency: None,
        }
    }

    pub fn self_changed(package: impl Into<PackageName>) -> Self {
        Self {
            package: package.into(),
            reason: RunReason::SelfChanged,
            changed_dependency: None,
        }
    }

    pub fn dependency_changed(
        package: impl Into<PackageName>,
        dependency: impl Into<PackageName>,
    ) -> Self {
        Self {
            package: package.into(),
            reason: RunReason::DependencyChanged,
            changed_dependency: Some(dependency.into()),
        }
    }
}

/// Why the runtime is asked to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / SIGTERM / Ctrl-C.
    Signal,
    /// An unrecoverable error somewhere in the process.
    Failure(String),
    /// The session ran out of work (`--once`) or lost its event sources.
    Finished,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once nothing is processing and the backlog
    /// is empty (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers, conductors and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A package's source tree changed.
    PackageChanged { package: PackageName },
    /// A conductor run finished.
    RunSettled {
        package: PackageName,
        outcome: RunOutcome,
    },
    /// Graceful shutdown requested.
    ShutdownRequested { reason: ShutdownReason },
}

pub mod backend;
pub mod conductor;
pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;
pub mod shutdown;
pub mod signals;

pub use backend::{ConductorBackend, ConductorPool};
pub use conductor::PackageConductor;
pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::{EnqueueOutcome, SchedulingQueue};
pub use runtime::{Runtime, RuntimeExit};
pub use shutdown::{ShutdownManager, ShutdownStatus};
