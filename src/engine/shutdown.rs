// src/engine/shutdown.rs

use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{Instant, timeout, timeout_at};
use tracing::{error, info, warn};

use crate::engine::ShutdownReason;
use crate::engine::backend::ConductorBackend;
use crate::watch::SourceWatcher;

/// How a shutdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownStatus {
    /// Everything was torn down and the shutdown was not caused by a failure.
    Completed,
    /// Teardown finished but something failed (or the shutdown itself was
    /// caused by a failure).
    Failed,
    /// The grace period elapsed before teardown completed.
    TimedOut,
    /// Another shutdown was already in progress.
    Ignored,
}

impl ShutdownStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ShutdownStatus::Completed | ShutdownStatus::Ignored)
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Coordinates the teardown of a develop session.
///
/// - Only the first [`shutdown`](ShutdownManager::shutdown) call does
///   anything.
/// - The post hook runs at most once.
/// - Teardown is bounded by the grace period; the post hook gets a nested
///   deadline of the same length when the grace period has already elapsed.
#[derive(Debug)]
pub struct ShutdownManager {
    grace_period: Duration,
    started: AtomicBool,
    post_hook_ran: AtomicBool,
}

impl ShutdownManager {
    pub fn new(grace_period: Duration) -> Self {
        Self {
            grace_period,
            started: AtomicBool::new(false),
            post_hook_ran: AtomicBool::new(false),
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn is_shutting_down(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Tear everything down.
    ///
    /// Stops all watchers, stops all conductors in parallel, then runs
    /// `post_hook` (which returns whether a hook was configured).
    pub async fn shutdown<B, F, Fut>(
        &self,
        reason: &ShutdownReason,
        watchers: &[SourceWatcher],
        backend: &mut B,
        post_hook: F,
    ) -> ShutdownStatus
    where
        B: ConductorBackend,
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::errors::Result<bool>>,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("shutdown already in progress; ignoring request");
            return ShutdownStatus::Ignored;
        }

        info!(?reason, grace_period = ?self.grace_period, "shutting down");
        let deadline = deadline_after(self.grace_period);
        let mut failed = matches!(reason, ShutdownReason::Failure(_));
        let mut timed_out = false;

        for watcher in watchers {
            watcher.stop();
        }

        match timeout_at(deadline, backend.stop_all()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "failed to stop develop instances");
                failed = true;
            }
            Err(_) => {
                warn!("grace period elapsed while stopping develop instances; forcing exit");
                timed_out = true;
            }
        }

        if self.post_hook_ran.swap(true, Ordering::SeqCst) {
            return finish(failed, timed_out);
        }

        let mut hook = pin!(post_hook());
        let mut result = None;
        if !timed_out {
            result = timeout_at(deadline, &mut hook).await.ok();
            if result.is_none() {
                warn!("grace period elapsed while running the post hook; forcing exit");
                timed_out = true;
            }
        }
        if result.is_none() {
            result = timeout(self.grace_period, &mut hook).await.ok();
        }

        match result {
            Some(Ok(true)) => info!("post hook finished"),
            Some(Ok(false)) => {}
            Some(Err(e)) => {
                error!(error = %e, "post hook failed");
                failed = true;
            }
            None => {
                warn!("post hook did not finish before the final deadline");
                failed = true;
            }
        }

        finish(failed, timed_out)
    }
}

/// `now + grace`, saturating to roughly thirty years out when that overflows.
fn deadline_after(grace: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(grace)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}

fn finish(failed: bool, timed_out: bool) -> ShutdownStatus {
    let status = if timed_out {
        ShutdownStatus::TimedOut
    } else if failed {
        ShutdownStatus::Failed
    } else {
        ShutdownStatus::Completed
    };
    info!(?status, "shutdown finished");
    status
}
