// src/commands/develop.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::cli::DevelopArgs;
use crate::commands::{Workspace, run_capability};
use crate::engine::signals::spawn_signal_listener;
use crate::engine::{
    ConductorPool, CoreRuntime, PackageConductor, PackageName, Runtime, RuntimeEvent, RuntimeExit,
    RuntimeOptions, SchedulingQueue, ShutdownManager, ShutdownReason, ShutdownStatus,
};
use crate::errors::Result;
use crate::exec::{HookStage, run_hook};
use crate::types::CommandKind;
use crate::watch::{ChangeCallback, SourceWatcher};

/// Capacity of the runtime event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Run the development service until a termination signal arrives (or, with
/// `--once`, until every package has been processed), then shut down.
///
/// Startup order: pre hook, clean every selected package, create watchers
/// and conductors, seed the queue, start watching, drain.
pub async fn develop(workspace: &Workspace, args: &DevelopArgs) -> Result<ShutdownStatus> {
    let graph = workspace
        .graph
        .filter(&args.filter.packages, args.filter.exact)?;
    let resolved = workspace.resolve_all(&graph)?;

    run_hook(&workspace.config, CommandKind::Develop, HookStage::Pre).await?;

    for (package, plugins) in resolved.iter() {
        if let Some(clean) = plugins.clean.as_ref() {
            run_capability(clean.as_ref(), CommandKind::Clean, package).await?;
        }
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(EVENT_CHANNEL_CAPACITY);

    // notify calls back on its own thread; bridge into the async runtime.
    let (change_tx, mut change_rx) = mpsc::unbounded_channel::<PackageName>();
    let forwarder = {
        let rt_tx = rt_tx.clone();
        tokio::spawn(async move {
            while let Some(package) = change_rx.recv().await {
                if rt_tx
                    .send(RuntimeEvent::PackageChanged { package })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        })
    };
    let on_change: ChangeCallback = Arc::new(move |package: &str| {
        let _ = change_tx.send(package.to_string());
    });

    let mut watchers = Vec::with_capacity(resolved.len());
    let mut conductors = Vec::with_capacity(resolved.len());
    for (package, plugins) in resolved {
        let watcher = SourceWatcher::new(&package, Arc::clone(&on_change));
        watchers.push(watcher.clone());
        conductors.push(PackageConductor::new(
            Arc::new(package),
            plugins.develop,
            plugins.build,
            watcher,
        ));
    }
    let pool = ConductorPool::new(conductors, rt_tx.clone());

    let mut queue = SchedulingQueue::new(&graph);
    queue.seed_first_run();

    for watcher in watchers.iter() {
        watcher.start()?;
    }

    let signals = spawn_signal_listener(rt_tx.clone());
    drop(rt_tx);

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };
    let mut runtime = Runtime::new(CoreRuntime::new(queue, options), rt_rx, pool);

    let reason = match runtime.run().await {
        Ok(RuntimeExit::Shutdown(reason)) => reason,
        Ok(RuntimeExit::Idle) | Ok(RuntimeExit::ChannelClosed) => ShutdownReason::Finished,
        Err(e) => {
            error!(error = %e, "develop runtime failed");
            ShutdownReason::Failure(e.to_string())
        }
    };

    let mut backend = runtime.into_backend();
    let manager = ShutdownManager::new(workspace.config.shutdown_grace_period());
    let status = manager
        .shutdown(&reason, &watchers, &mut backend, || {
            run_hook(&workspace.config, CommandKind::Develop, HookStage::Post)
        })
        .await;

    signals.abort();
    forwarder.abort();

    info!(?status, "develop session ended");
    Ok(status)
}
