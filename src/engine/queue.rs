// src/engine/queue.rs

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::{debug, error, info, warn};

use crate::engine::{PackageName, QueueItem, RunOutcome, RunReason};
use crate::graph::PackageGraph;

/// What [`SchedulingQueue::queue_for_processing`] did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended to the backlog; `replaced` are the dependants that were
    /// removed because the new item will re-trigger them.
    Queued { replaced: Vec<PackageName> },
    /// The package being processed has the target as a dependant, so its
    /// completion will queue the target anyway.
    SkippedInFlightUpstream { upstream: PackageName },
    /// A backlog item has the target as a dependant.
    SkippedQueuedUpstream { upstream: PackageName },
    /// The target is already waiting in the backlog.
    SkippedAlreadyQueued,
    /// Not a package of this graph.
    UnknownPackage,
}

impl EnqueueOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, EnqueueOutcome::Queued { .. })
    }
}

/// Backlog of packages waiting to be processed, plus the single package
/// currently being processed.
///
/// Semantics:
/// - At most one package is processing at any time. [`process_next`] refuses
///   to pop while something is in flight.
/// - New requests only ever queue "frontier" packages: the backlog never gets
///   a package together with one of its direct dependants through
///   [`queue_for_processing`]. Dependants are queued lazily, when their
///   dependency settles successfully.
/// - The `FirstRun` seed is appended as-is in build order, so on startup a
///   dependant may sit behind its dependency; settle does not queue it twice.
///
/// All methods are synchronous and never block; the caller is responsible
/// for dispatching the item returned by [`process_next`] and reporting back
/// through [`settle`].
///
/// [`process_next`]: SchedulingQueue::process_next
/// [`queue_for_processing`]: SchedulingQueue::queue_for_processing
/// [`settle`]: SchedulingQueue::settle
#[derive(Debug, Clone)]
pub struct SchedulingQueue {
    /// Direct dependants per package.
    dependants: HashMap<PackageName, BTreeSet<PackageName>>,
    /// Build order, used for seeding.
    order: Vec<PackageName>,
    backlog: VecDeque<QueueItem>,
    currently_processing: Option<PackageName>,
}

impl SchedulingQueue {
    /// Empty queue over the packages of `graph`.
    pub fn new(graph: &PackageGraph) -> Self {
        let dependants = graph
            .ordered()
            .map(|pkg| (pkg.name.clone(), pkg.dependants.clone()))
            .collect();

        Self {
            dependants,
            order: graph.names().to_vec(),
            backlog: VecDeque::new(),
            currently_processing: None,
        }
    }

    /// Append a `FirstRun` item for every package, in build order.
    pub fn seed_first_run(&mut self) {
        for name in self.order.iter() {
            self.backlog.push_back(QueueItem::first_run(name.clone()));
        }
        debug!(backlog = ?self.pending_packages(), "seeded first run backlog");
    }

    /// Request processing of `target`.
    ///
    /// Rules, in order:
    /// 1. skip if the in-flight package has `target` as a direct dependant;
    /// 2. skip if a backlog item has `target` as a direct dependant;
    /// 3. skip if `target` is already in the backlog;
    /// 4. otherwise drop the direct dependants of `target` from the backlog
    ///    and append `target`.
    pub fn queue_for_processing(
        &mut self,
        target: &str,
        reason: RunReason,
        changed_dependency: Option<&str>,
    ) -> EnqueueOutcome {
        if !self.dependants.contains_key(target) {
            warn!(package = %target, "ignoring request for unknown package");
            return EnqueueOutcome::UnknownPackage;
        }

        if let Some(current) = self.currently_processing.as_deref() {
            if self.is_dependant_of(target, current) {
                debug!(
                    package = %target,
                    upstream = %current,
                    "skipped: in-flight dependency will re-trigger it"
                );
                return EnqueueOutcome::SkippedInFlightUpstream {
                    upstream: current.to_string(),
                };
            }
        }

        if let Some(upstream) = self
            .backlog
            .iter()
            .find(|item| self.is_dependant_of(target, &item.package))
        {
            debug!(
                package = %target,
                upstream = %upstream.package,
                "skipped: queued dependency will re-trigger it"
            );
            return EnqueueOutcome::SkippedQueuedUpstream {
                upstream: upstream.package.clone(),
            };
        }

        if self.backlog.iter().any(|item| item.package == target) {
            debug!(package = %target, "skipped: already queued");
            return EnqueueOutcome::SkippedAlreadyQueued;
        }

        let mut replaced = Vec::new();
        let dependants = self.dependants.get(target).cloned().unwrap_or_default();
        self.backlog.retain(|item| {
            if dependants.contains(&item.package) {
                replaced.push(item.package.clone());
                false
            } else {
                true
            }
        });

        let changed_dependency = match reason {
            RunReason::DependencyChanged => changed_dependency.map(|d| d.to_string()),
            _ => None,
        };
        self.backlog.push_back(QueueItem {
            package: target.to_string(),
            reason,
            changed_dependency,
        });

        info!(package = %target, %reason, ?replaced, "queued package");
        EnqueueOutcome::Queued { replaced }
    }

    /// Pop the oldest backlog item and mark it as processing.
    ///
    /// Returns `None` when the backlog is empty, or (logging an error) when
    /// something is already processing.
    pub fn process_next(&mut self) -> Option<QueueItem> {
        if let Some(current) = self.currently_processing.as_deref() {
            error!(
                package = %current,
                "process_next called while a package is still processing; ignoring"
            );
            return None;
        }

        let item = self.backlog.pop_front()?;
        self.currently_processing = Some(item.package.clone());
        debug!(package = %item.package, reason = %item.reason, "processing package");
        Some(item)
    }

    /// Record that the in-flight run of `package` finished.
    ///
    /// On success every direct dependant that is not already waiting is
    /// queued with [`RunReason::DependencyChanged`]. Returns the outcome of
    /// each such request. A settle for a package that is not processing is
    /// logged and ignored.
    pub fn settle(&mut self, package: &str, outcome: &RunOutcome) -> Vec<EnqueueOutcome> {
        if self.currently_processing.as_deref() != Some(package) {
            error!(
                package = %package,
                processing = ?self.currently_processing,
                "settle for a package that is not processing; ignoring"
            );
            return Vec::new();
        }
        self.currently_processing = None;

        if let RunOutcome::Failed(message) = outcome {
            warn!(package = %package, error = %message, "run failed; dependants not queued");
            return Vec::new();
        }

        let dependants = self.dependants.get(package).cloned().unwrap_or_default();
        let mut outcomes = Vec::new();
        for dependant in dependants.iter() {
            if self.is_queued(dependant) {
                continue;
            }
            outcomes.push(self.queue_for_processing(
                dependant,
                RunReason::DependencyChanged,
                Some(package),
            ));
        }
        outcomes
    }

    /// Whether `candidate` is a direct dependant of `package`.
    fn is_dependant_of(&self, candidate: &str, package: &str) -> bool {
        self.dependants
            .get(package)
            .map(|set| set.contains(candidate))
            .unwrap_or(false)
    }

    pub fn is_queued(&self, package: &str) -> bool {
        self.backlog.iter().any(|item| item.package == package)
    }

    pub fn currently_processing(&self) -> Option<&str> {
        self.currently_processing.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.currently_processing.is_some()
    }

    /// Nothing processing and nothing waiting.
    pub fn is_idle(&self) -> bool {
        self.currently_processing.is_none() && self.backlog.is_empty()
    }

    pub fn backlog(&self) -> impl Iterator<Item = &QueueItem> {
        self.backlog.iter()
    }

    pub fn pending_packages(&self) -> Vec<&str> {
        self.backlog.iter().map(|item| item.package.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }
}
