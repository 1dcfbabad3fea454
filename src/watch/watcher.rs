// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Context, Result, anyhow};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::engine::PackageName;
use crate::package::Package;
use crate::watch::path_utils::is_within;

/// Called with the package name for every qualifying filesystem event.
pub type ChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Watches one package root and reports changes through a callback.
///
/// Cloning yields another handle to the same watcher, so the handle can be
/// given to a develop plugin that wants to pause watching while it runs its
/// own watch mode.
#[derive(Clone)]
pub struct SourceWatcher {
    package: PackageName,
    root: PathBuf,
    ignored: PathBuf,
    disabled: bool,
    on_change: ChangeCallback,
    state: Arc<Mutex<Option<ActiveWatch>>>,
}

/// A live OS watch. Dropping it releases the handle.
struct ActiveWatch {
    _inner: RecommendedWatcher,
    /// Cleared on stop so that events already in flight inside notify are
    /// not delivered. Callbacks run under the read lock, so clearing it
    /// waits for a callback that is already running.
    live: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher")
            .field("package", &self.package)
            .field("root", &self.root)
            .field("disabled", &self.disabled)
            .field("watching", &self.is_watching())
            .finish()
    }
}

impl SourceWatcher {
    pub fn new(package: &Package, on_change: ChangeCallback) -> Self {
        Self {
            package: package.name.clone(),
            root: package.paths.root.clone(),
            ignored: package.paths.build_output.clone(),
            disabled: package.watching_disabled(),
            on_change,
            state: Arc::new(Mutex::new(None)),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_watching(&self) -> bool {
        self.state.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Begin watching the package root.
    ///
    /// Returns `Ok(true)` if a new OS watch was created, `Ok(false)` if the
    /// watcher was already running or watching is disabled.
    pub fn start(&self) -> Result<bool> {
        if self.disabled {
            debug!(package = %self.package, "source watching disabled");
            return Ok(false);
        }

        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("watcher state poisoned for '{}'", self.package))?;
        if state.is_some() {
            return Ok(false);
        }

        let live = Arc::new(RwLock::new(true));
        let mut watcher = RecommendedWatcher::new(
            {
                let live = Arc::clone(&live);
                let package = self.package.clone();
                let ignored = self.ignored.clone();
                let on_change = Arc::clone(&self.on_change);
                move |res: notify::Result<Event>| {
                    let Ok(live) = live.read() else { return };
                    if !*live {
                        return;
                    }
                    match res {
                        Ok(event) => {
                            if is_source_change(&event, &ignored) {
                                debug!(package = %package, paths = ?event.paths, "source change");
                                on_change(&package);
                            }
                        }
                        Err(err) => {
                            warn!(package = %package, error = %err, "file watch error");
                        }
                    }
                }
            },
            Config::default(),
        )
        .with_context(|| format!("creating watcher for package '{}'", self.package))?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .with_context(|| format!("watching {:?}", self.root))?;

        info!(package = %self.package, root = ?self.root, "watching sources");
        *state = Some(ActiveWatch {
            _inner: watcher,
            live,
        });
        Ok(true)
    }

    /// Stop watching. Returns whether a watch was active.
    ///
    /// Blocks until a callback that is already running has returned, so no
    /// callback runs once this returns. Must not be called from inside the
    /// change callback.
    pub fn stop(&self) -> bool {
        let active = match self.state.lock() {
            Ok(mut state) => state.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match active {
            Some(active) => {
                match active.live.write() {
                    Ok(mut live) => *live = false,
                    Err(poisoned) => *poisoned.into_inner() = false,
                }
                drop(active);
                debug!(package = %self.package, "stopped watching sources");
                true
            }
            None => false,
        }
    }
}

/// Create / modify / remove events with at least one path outside `ignored`.
fn is_source_change(event: &Event, ignored: &std::path::Path) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant_kind && event.paths.iter().any(|p| !is_within(ignored, p))
}
