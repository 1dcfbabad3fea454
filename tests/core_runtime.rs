// tests/core_runtime.rs

mod common;
use crate::common::builders::GraphBuilder;

use monodev::engine::{
    CoreCommand, CoreRuntime, QueueItem, RunOutcome, RuntimeEvent, RuntimeOptions,
    SchedulingQueue, ShutdownReason,
};
use monodev::graph::PackageGraph;

fn chain() -> PackageGraph {
    GraphBuilder::new()
        .package("lib", &[])
        .package("app", &["lib"])
        .build()
}

fn core(graph: &PackageGraph, seed: bool, exit_when_idle: bool) -> CoreRuntime {
    let mut queue = SchedulingQueue::new(graph);
    if seed {
        queue.seed_first_run();
    }
    CoreRuntime::new(queue, RuntimeOptions { exit_when_idle })
}

fn settled(package: &str) -> RuntimeEvent {
    RuntimeEvent::RunSettled {
        package: package.to_string(),
        outcome: RunOutcome::Success,
    }
}

fn changed(package: &str) -> RuntimeEvent {
    RuntimeEvent::PackageChanged {
        package: package.to_string(),
    }
}

#[test]
fn test_start_dispatches_first_seeded_package() {
    let graph = chain();
    let mut core = core(&graph, true, false);

    let step = core.start();
    assert!(step.keep_running);
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::first_run("lib"))]
    );
}

#[test]
fn test_start_without_work_in_once_mode_exits() {
    let graph = chain();
    let mut core = core(&graph, false, true);

    let step = core.start();
    assert!(!step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
}

#[test]
fn test_start_without_work_keeps_waiting() {
    let graph = chain();
    let mut core = core(&graph, false, false);

    let step = core.start();
    assert!(step.keep_running);
    assert!(step.commands.is_empty());
}

#[test]
fn test_once_mode_drains_seed_then_exits() {
    let graph = chain();
    let mut core = core(&graph, true, true);
    core.start();

    let step = core.step(settled("lib"));
    assert!(step.keep_running);
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::first_run("app"))]
    );

    let step = core.step(settled("app"));
    assert!(!step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
}

#[test]
fn test_change_while_idle_dispatches_immediately() {
    let graph = chain();
    let mut core = core(&graph, false, false);
    core.start();

    let step = core.step(changed("app"));
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::self_changed("app"))]
    );
    assert_eq!(core.queue().currently_processing(), Some("app"));
}

#[test]
fn test_change_while_busy_waits_for_settle() {
    let graph = chain();
    let mut core = core(&graph, false, false);
    core.start();

    core.step(changed("app"));
    let step = core.step(changed("lib"));
    assert!(step.commands.is_empty());
    assert_eq!(core.queue().pending_packages(), vec!["lib"]);

    let step = core.step(settled("app"));
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::self_changed("lib"))]
    );

    let step = core.step(settled("lib"));
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::dependency_changed("app", "lib"))]
    );
}

#[test]
fn test_change_of_dependant_during_upstream_run_is_absorbed() {
    let graph = chain();
    let mut core = core(&graph, false, false);
    core.start();

    core.step(changed("lib"));
    let step = core.step(changed("app"));
    assert!(step.commands.is_empty());
    assert!(core.queue().is_empty());

    let step = core.step(settled("lib"));
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::dependency_changed("app", "lib"))]
    );
}

#[test]
fn test_failure_moves_on_without_dependants() {
    let graph = GraphBuilder::new()
        .package("lib", &[])
        .package("app", &["lib"])
        .package("docs", &[])
        .build();
    let mut core = core(&graph, false, false);
    core.start();

    core.step(changed("lib"));
    core.step(changed("docs"));

    let step = core.step(RuntimeEvent::RunSettled {
        package: "lib".to_string(),
        outcome: RunOutcome::Failed("compile error".to_string()),
    });
    assert_eq!(
        step.commands,
        vec![CoreCommand::Dispatch(QueueItem::self_changed("docs"))]
    );
    assert!(!core.queue().is_queued("app"));
}

#[test]
fn test_shutdown_request_stops_core() {
    let graph = chain();
    let mut core = core(&graph, true, false);
    core.start();

    let step = core.step(RuntimeEvent::ShutdownRequested {
        reason: ShutdownReason::Signal,
    });
    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}
