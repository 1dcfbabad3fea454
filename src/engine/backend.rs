// src/engine/backend.rs

//! Pluggable conductor backend abstraction.
//!
//! The runtime talks to a `ConductorBackend` instead of the conductors
//! directly. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation ([`ConductorPool`]) here.
//!
//! - `ConductorPool` runs each dispatched item on its package's
//!   [`PackageConductor`] in a spawned task and reports the result back as
//!   `RuntimeEvent::RunSettled`.
//! - Tests can provide their own `ConductorBackend` that, for example,
//!   records which items were dispatched and settles them directly.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::engine::conductor::PackageConductor;
use crate::engine::{PackageName, QueueItem, RunOutcome, RuntimeEvent, ShutdownReason};
use crate::errors::{MonodevError, Result};

/// Boxed future returned by backend operations.
pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait abstracting how dispatched queue items are run.
pub trait ConductorBackend: Send {
    /// Start processing `item`. Must not wait for the run to finish; the
    /// outcome is reported through a `RunSettled` event.
    fn dispatch(&mut self, item: QueueItem) -> BackendFuture<'_>;

    /// Stop every conductor's running instance, in parallel.
    fn stop_all(&mut self) -> BackendFuture<'_>;
}

/// Production backend: one [`PackageConductor`] per package.
#[derive(Debug, Clone)]
pub struct ConductorPool {
    conductors: HashMap<PackageName, Arc<Mutex<PackageConductor>>>,
    events: mpsc::Sender<RuntimeEvent>,
}

impl ConductorPool {
    pub fn new(conductors: Vec<PackageConductor>, events: mpsc::Sender<RuntimeEvent>) -> Self {
        let conductors = conductors
            .into_iter()
            .map(|c| (c.package().name.clone(), Arc::new(Mutex::new(c))))
            .collect();
        Self { conductors, events }
    }
}

impl ConductorBackend for ConductorPool {
    fn dispatch(&mut self, item: QueueItem) -> BackendFuture<'_> {
        let conductor = self.conductors.get(&item.package).cloned();
        let events = self.events.clone();

        Box::pin(async move {
            let Some(conductor) = conductor else {
                events
                    .send(RuntimeEvent::RunSettled {
                        outcome: RunOutcome::Failed(format!(
                            "no conductor for package '{}'",
                            item.package
                        )),
                        package: item.package,
                    })
                    .await
                    .map_err(|e| MonodevError::Other(e.into()))?;
                return Ok(());
            };

            // Run in its own task so a panicking plugin surfaces as a
            // JoinError instead of taking the runtime down.
            tokio::spawn(async move {
                let package = item.package.clone();
                let run = tokio::spawn(async move {
                    let mut conductor = conductor.lock().await;
                    conductor
                        .run(item.reason, item.changed_dependency.as_deref())
                        .await
                        .map(|_| ())
                });

                let event = match run.await {
                    Ok(Ok(())) => RuntimeEvent::RunSettled {
                        package,
                        outcome: RunOutcome::Success,
                    },
                    Ok(Err(e)) => RuntimeEvent::RunSettled {
                        package,
                        outcome: RunOutcome::Failed(e.to_string()),
                    },
                    Err(join) => {
                        error!(package = %package, error = %join, "conductor task failed");
                        RuntimeEvent::ShutdownRequested {
                            reason: ShutdownReason::Failure(format!(
                                "conductor task for '{package}' failed: {join}"
                            )),
                        }
                    }
                };

                if events.send(event).await.is_err() {
                    debug!("runtime gone; dropping conductor result");
                }
            });

            Ok(())
        })
    }

    fn stop_all(&mut self) -> BackendFuture<'_> {
        let conductors: Vec<_> = self
            .conductors
            .iter()
            .map(|(name, c)| (name.clone(), Arc::clone(c)))
            .collect();

        Box::pin(async move {
            let mut set = JoinSet::new();
            for (name, conductor) in conductors {
                set.spawn(async move {
                    let result = conductor.lock().await.stop().await;
                    (name, result)
                });
            }

            let mut failures = Vec::new();
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => {}
                    Ok((name, Err(e))) => {
                        warn!(package = %name, error = %e, "failed to stop conductor");
                        failures.push(format!("{name}: {e}"));
                    }
                    Err(join) => failures.push(format!("stop task failed: {join}")),
                }
            }

            if failures.is_empty() {
                Ok(())
            } else {
                Err(MonodevError::Shutdown(failures.join("; ")))
            }
        })
    }
}
