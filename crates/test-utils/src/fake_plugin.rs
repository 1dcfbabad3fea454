use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use monodev::engine::RunReason;
use monodev::errors::MonodevError;
use monodev::package::Package;
use monodev::plugin::{DevelopContext, DevelopInstance, Plugin, PluginFuture, PluginRegistry};

/// Identifier the recording plugin is registered under.
pub const RECORDING: &str = "recording";

/// One call observed by a [`RecordingPlugin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub package: String,
    pub capability: &'static str,
    pub reason: Option<RunReason>,
    pub changed_dependency: Option<String>,
}

/// Calls and kills shared by every plugin created from one registry.
#[derive(Debug, Clone, Default)]
pub struct PluginLog {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub kills: Arc<AtomicUsize>,
}

impl PluginLog {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// `(package, capability)` pairs in call order.
    pub fn summary(&self) -> Vec<(String, &'static str)> {
        self.calls()
            .into_iter()
            .map(|c| (c.package, c.capability))
            .collect()
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }
}

/// Plugin that records every capability call. Every call fails when it was
/// created with `fail`.
#[derive(Debug)]
pub struct RecordingPlugin {
    log: PluginLog,
    fail: bool,
}

impl RecordingPlugin {
    pub fn new(log: PluginLog, fail: bool) -> Self {
        Self { log, fail }
    }

    fn record(
        &self,
        package: &Package,
        capability: &'static str,
        reason: Option<RunReason>,
        changed_dependency: Option<&str>,
    ) -> monodev::errors::Result<()> {
        self.log.calls.lock().unwrap().push(Call {
            package: package.name.clone(),
            capability,
            reason,
            changed_dependency: changed_dependency.map(|s| s.to_string()),
        });
        if self.fail {
            Err(MonodevError::package(package.name.clone(), format!("{capability} failed")))
        } else {
            Ok(())
        }
    }
}

/// Develop instance that counts kills.
#[derive(Debug)]
pub struct CountingInstance {
    kills: Arc<AtomicUsize>,
}

impl CountingInstance {
    pub fn new(kills: Arc<AtomicUsize>) -> Self {
        Self { kills }
    }
}

impl DevelopInstance for CountingInstance {
    fn kill(&self) -> PluginFuture<'_, ()> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        RECORDING
    }

    fn clean<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        let result = self.record(package, "clean", None, None);
        Box::pin(async move { result })
    }

    fn build<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        let result = self.record(package, "build", None, None);
        Box::pin(async move { result })
    }

    fn develop<'a>(
        &'a self,
        package: &'a Package,
        ctx: DevelopContext<'a>,
    ) -> PluginFuture<'a, Arc<dyn DevelopInstance>> {
        let result = self.record(package, "develop", Some(ctx.reason), ctx.changed_dependency);
        let kills = Arc::clone(&self.log.kills);
        Box::pin(async move {
            result?;
            Ok(Arc::new(CountingInstance::new(kills)) as Arc<dyn DevelopInstance>)
        })
    }

    fn deploy<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        let result = self.record(package, "deploy", None, None);
        Box::pin(async move { result })
    }
}

/// Built-in registry plus `recording`, which fails for packages whose
/// plugin options contain `fail = true`.
pub fn recording_registry(log: PluginLog) -> PluginRegistry {
    let mut registry = PluginRegistry::with_builtins();
    registry.register(RECORDING, move |_pkg, options| {
        let fail = options
            .get("fail")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(Arc::new(RecordingPlugin::new(log.clone(), fail)) as Arc<dyn Plugin>)
    });
    registry
}
