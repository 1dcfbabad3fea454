// src/engine/conductor.rs

use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::RunReason;
use crate::errors::Result;
use crate::package::Package;
use crate::plugin::{DevelopContext, DevelopInstance, NoopInstance, Plugin};
use crate::watch::SourceWatcher;

/// Owner of the single running develop instance of one package.
///
/// States:
/// - idle: `running` is `None`
/// - running: `running` holds the instance returned by the last successful
///   develop run
///
/// A failed run leaves the previous instance untouched. Stopping the old
/// instance before a new run is up to the plugin.
#[derive(Debug)]
pub struct PackageConductor {
    package: Arc<Package>,
    develop_plugin: Option<Arc<dyn Plugin>>,
    build_plugin: Option<Arc<dyn Plugin>>,
    watcher: SourceWatcher,
    running: Option<Arc<dyn DevelopInstance>>,
}

impl PackageConductor {
    pub fn new(
        package: Arc<Package>,
        develop_plugin: Option<Arc<dyn Plugin>>,
        build_plugin: Option<Arc<dyn Plugin>>,
        watcher: SourceWatcher,
    ) -> Self {
        Self {
            package,
            develop_plugin,
            build_plugin,
            watcher,
            running: None,
        }
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn watcher(&self) -> &SourceWatcher {
        &self.watcher
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Run the package's develop plugin.
    ///
    /// Without a develop plugin this succeeds immediately with a no-op
    /// instance and changes nothing.
    pub async fn run(
        &mut self,
        reason: RunReason,
        changed_dependency: Option<&str>,
    ) -> Result<Arc<dyn DevelopInstance>> {
        let Some(plugin) = self.develop_plugin.clone() else {
            debug!(package = %self.package.name, "no develop plugin; nothing to run");
            return Ok(Arc::new(NoopInstance));
        };

        info!(
            package = %self.package.name,
            %reason,
            changed_dependency = ?changed_dependency,
            plugin = plugin.name(),
            "running develop"
        );

        let ctx = DevelopContext {
            reason,
            changed_dependency,
            watcher: &self.watcher,
            build_plugin: self.build_plugin.as_deref(),
        };
        let instance = plugin.develop(&self.package, ctx).await?;

        self.running = Some(Arc::clone(&instance));
        Ok(instance)
    }

    /// Kill the stored instance, if any, and forget it.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(instance) = self.running.as_ref() else {
            return Ok(());
        };

        debug!(package = %self.package.name, "stopping develop instance");
        instance.kill().await?;
        self.running = None;
        Ok(())
    }
}
