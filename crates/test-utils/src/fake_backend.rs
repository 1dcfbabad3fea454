use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use monodev::engine::backend::BackendFuture;
use monodev::engine::{ConductorBackend, QueueItem, RunOutcome, RuntimeEvent};
use monodev::errors::MonodevError;

/// Shared view of what a [`FakeConductorBackend`] observed.
#[derive(Debug, Clone, Default)]
pub struct FakeBackendLog {
    pub dispatched: Arc<Mutex<Vec<QueueItem>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    pub stop_calls: Arc<AtomicUsize>,
}

impl FakeBackendLog {
    pub fn packages(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.package.clone())
            .collect()
    }

    pub fn items(&self) -> Vec<QueueItem> {
        self.dispatched.lock().unwrap().clone()
    }
}

/// How `stop_all` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBehaviour {
    Succeed,
    Fail,
    /// Never resolves.
    Hang,
}

/// A fake backend that:
/// - records which items were dispatched
/// - settles each one after `delay` on a spawned task, failing the packages
///   listed in `failing`
/// - tracks how many runs are in flight at once.
pub struct FakeConductorBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    failing: HashSet<String>,
    delay: Duration,
    stop: StopBehaviour,
    log: FakeBackendLog,
}

impl FakeConductorBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            failing: HashSet::new(),
            delay: Duration::from_millis(0),
            stop: StopBehaviour::Succeed,
            log: FakeBackendLog::default(),
        }
    }

    pub fn failing(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_stop(mut self, stop: StopBehaviour) -> Self {
        self.stop = stop;
        self
    }

    pub fn log(&self) -> FakeBackendLog {
        self.log.clone()
    }
}

impl ConductorBackend for FakeConductorBackend {
    fn dispatch(&mut self, item: QueueItem) -> BackendFuture<'_> {
        let tx = self.runtime_tx.clone();
        let log = self.log.clone();
        let delay = self.delay;
        let outcome = if self.failing.contains(&item.package) {
            RunOutcome::Failed(format!("{} failed on purpose", item.package))
        } else {
            RunOutcome::Success
        };

        Box::pin(async move {
            let now = log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            log.max_in_flight.fetch_max(now, Ordering::SeqCst);
            log.dispatched.lock().unwrap().push(item.clone());

            tokio::spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                log.in_flight.fetch_sub(1, Ordering::SeqCst);
                let _ = tx
                    .send(RuntimeEvent::RunSettled {
                        package: item.package,
                        outcome,
                    })
                    .await;
            });
            Ok(())
        })
    }

    fn stop_all(&mut self) -> BackendFuture<'_> {
        self.log.stop_calls.fetch_add(1, Ordering::SeqCst);
        let stop = self.stop;
        Box::pin(async move {
            match stop {
                StopBehaviour::Succeed => Ok(()),
                StopBehaviour::Fail => Err(MonodevError::Shutdown("stop failed on purpose".into())),
                StopBehaviour::Hang => std::future::pending().await,
            }
        })
    }
}
