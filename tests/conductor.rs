// tests/conductor.rs

mod common;
use crate::common::builders::{GraphBuilder, RawPackageBuilder};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use monodev::config::PluginRef;
use monodev::engine::{
    ConductorBackend, ConductorPool, CoreRuntime, PackageConductor, RunReason, Runtime,
    RuntimeExit, RuntimeOptions, SchedulingQueue,
};
use monodev::errors::MonodevError;
use monodev::package::Package;
use monodev::plugin::{
    DevelopContext, DevelopInstance, Plugin, PluginFuture, PluginResolver,
};
use monodev::watch::SourceWatcher;
use monodev_test_utils::fake_plugin::{
    CountingInstance, PluginLog, RECORDING, RecordingPlugin, recording_registry,
};
use tokio::sync::mpsc;

/// Develop plugin whose runs fail while `failing` is set.
#[derive(Debug)]
struct FlakyPlugin {
    failing: Arc<AtomicBool>,
    log: PluginLog,
}

impl Plugin for FlakyPlugin {
    fn name(&self) -> &str {
        "flaky"
    }

    fn develop<'a>(
        &'a self,
        package: &'a Package,
        _ctx: DevelopContext<'a>,
    ) -> PluginFuture<'a, Arc<dyn DevelopInstance>> {
        let failing = self.failing.load(Ordering::SeqCst);
        let kills = Arc::clone(&self.log.kills);
        Box::pin(async move {
            if failing {
                return Err(MonodevError::package(package.name.clone(), "develop failed"));
            }
            Ok(Arc::new(CountingInstance::new(kills)) as Arc<dyn DevelopInstance>)
        })
    }
}

fn package(name: &str) -> Arc<Package> {
    let graph = GraphBuilder::new().package(name, &[]).build();
    Arc::new(graph.get(name).unwrap().clone())
}

fn idle_watcher(package: &Package) -> SourceWatcher {
    SourceWatcher::new(package, Arc::new(|_: &str| {}))
}

#[tokio::test]
async fn test_run_without_develop_plugin_is_noop() {
    let pkg = package("lib");
    let watcher = idle_watcher(&pkg);
    let mut conductor = PackageConductor::new(pkg, None, None, watcher);

    let instance = conductor.run(RunReason::FirstRun, None).await.unwrap();
    instance.kill().await.unwrap();
    assert!(!conductor.is_running());
}

#[tokio::test]
async fn test_successful_run_is_stored_and_stop_kills_it() {
    let log = PluginLog::default();
    let pkg = package("app");
    let watcher = idle_watcher(&pkg);
    let plugin: Arc<dyn Plugin> = Arc::new(RecordingPlugin::new(log.clone(), false));
    let mut conductor = PackageConductor::new(pkg, Some(plugin), None, watcher);

    conductor
        .run(RunReason::DependencyChanged, Some("lib"))
        .await
        .unwrap();
    assert!(conductor.is_running());

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].reason, Some(RunReason::DependencyChanged));
    assert_eq!(calls[0].changed_dependency.as_deref(), Some("lib"));

    conductor.stop().await.unwrap();
    assert!(!conductor.is_running());
    assert_eq!(log.kills(), 1);

    // Stopping again is a no-op.
    conductor.stop().await.unwrap();
    assert_eq!(log.kills(), 1);
}

#[tokio::test]
async fn test_failed_run_keeps_previous_instance() {
    let log = PluginLog::default();
    let failing = Arc::new(AtomicBool::new(false));
    let plugin: Arc<dyn Plugin> = Arc::new(FlakyPlugin {
        failing: Arc::clone(&failing),
        log: log.clone(),
    });

    let pkg = package("server");
    let watcher = idle_watcher(&pkg);
    let mut conductor = PackageConductor::new(pkg, Some(plugin), None, watcher);

    conductor.run(RunReason::FirstRun, None).await.unwrap();
    assert!(conductor.is_running());

    failing.store(true, Ordering::SeqCst);
    let result = conductor.run(RunReason::SelfChanged, None).await;
    match result {
        Err(MonodevError::Package { package, .. }) => assert_eq!(package, "server"),
        other => panic!("Expected package error, got: {:?}", other.map(|_| ())),
    }

    assert!(conductor.is_running());
    conductor.stop().await.unwrap();
    assert_eq!(log.kills(), 1);
}

#[tokio::test]
async fn test_develop_build_runs_the_build_plugin() {
    let log = PluginLog::default();
    let resolver = PluginResolver::new(recording_registry(log.clone()));

    let graph = GraphBuilder::new()
        .raw(
            RawPackageBuilder::new("web")
                .build_plugin(PluginRef::named(RECORDING))
                .build(),
        )
        .build();
    let pkg = graph.get("web").unwrap().clone();
    let plugins = resolver.resolve(&pkg).unwrap();

    assert_eq!(plugins.develop.as_ref().map(|p| p.name()), Some("develop-build"));
    assert_eq!(plugins.clean.as_ref().map(|p| p.name()), Some("clean-build"));

    let watcher = idle_watcher(&pkg);
    let mut conductor = PackageConductor::new(Arc::new(pkg), plugins.develop, plugins.build, watcher);
    conductor.run(RunReason::SelfChanged, None).await.unwrap();

    assert_eq!(log.summary(), vec![("web".to_string(), "build")]);
}

#[tokio::test]
async fn test_develop_build_without_build_plugin_fails() {
    let resolver = PluginResolver::new(recording_registry(PluginLog::default()));
    let graph = GraphBuilder::new()
        .raw(
            RawPackageBuilder::new("web")
                .develop_plugin(PluginRef::named("develop-build"))
                .build(),
        )
        .build();
    let pkg = graph.get("web").unwrap().clone();
    let plugins = resolver.resolve(&pkg).unwrap();

    let watcher = idle_watcher(&pkg);
    let mut conductor = PackageConductor::new(Arc::new(pkg), plugins.develop, None, watcher);
    let result = conductor.run(RunReason::FirstRun, None).await;

    assert!(matches!(result, Err(MonodevError::Package { .. })));
    assert!(!conductor.is_running());
}

#[tokio::test]
async fn test_noop_develop_still_propagates_to_dependants() {
    init_tracing();
    let log = PluginLog::default();
    let graph = GraphBuilder::new()
        .package("lib", &[])
        .package("app", &["lib"])
        .build();

    let recording: Arc<dyn Plugin> = Arc::new(RecordingPlugin::new(log.clone(), false));
    let conductors = graph
        .ordered()
        .map(|pkg| {
            let develop = (pkg.name == "app").then(|| Arc::clone(&recording));
            let watcher = idle_watcher(pkg);
            PackageConductor::new(Arc::new(pkg.clone()), develop, None, watcher)
        })
        .collect();

    let (tx, rx) = mpsc::channel(16);
    let pool = ConductorPool::new(conductors, tx);

    let mut queue = SchedulingQueue::new(&graph);
    queue.queue_for_processing("lib", RunReason::SelfChanged, None);
    let core = CoreRuntime::new(queue, RuntimeOptions { exit_when_idle: true });

    let mut runtime = Runtime::new(core, rx, pool);
    let exit = with_timeout(runtime.run()).await.unwrap();
    assert_eq!(exit, RuntimeExit::Idle);

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].package, "app");
    assert_eq!(calls[0].reason, Some(RunReason::DependencyChanged));
    assert_eq!(calls[0].changed_dependency.as_deref(), Some("lib"));

    let mut pool = runtime.into_backend();
    pool.stop_all().await.unwrap();
    assert_eq!(log.kills(), 1);
}

#[tokio::test]
async fn test_pool_reports_failures_as_failed_runs() {
    init_tracing();
    let log = PluginLog::default();
    let graph = GraphBuilder::new()
        .package("lib", &[])
        .package("app", &["lib"])
        .build();

    let failing: Arc<dyn Plugin> = Arc::new(RecordingPlugin::new(log.clone(), true));
    let conductors = graph
        .ordered()
        .map(|pkg| {
            let watcher = idle_watcher(pkg);
            PackageConductor::new(Arc::new(pkg.clone()), Some(Arc::clone(&failing)), None, watcher)
        })
        .collect();

    let (tx, rx) = mpsc::channel(16);
    let pool = ConductorPool::new(conductors, tx);

    let mut queue = SchedulingQueue::new(&graph);
    queue.queue_for_processing("lib", RunReason::SelfChanged, None);
    let core = CoreRuntime::new(queue, RuntimeOptions { exit_when_idle: true });

    let mut runtime = Runtime::new(core, rx, pool);
    with_timeout(runtime.run()).await.unwrap();

    assert_eq!(log.summary(), vec![("lib".to_string(), "develop")]);
}
