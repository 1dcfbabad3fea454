// src/plugin/script.rs

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{MonodevError, Result};
use crate::exec::{ChildInstance, Readiness, run_to_completion, spawn_long_lived};
use crate::package::Package;
use crate::plugin::{
    DevelopContext, DevelopInstance, Plugin, PluginFuture, parse_options, readiness_from,
};

pub const SCRIPT: &str = "script";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptOptions {
    /// Key of the manifest `[scripts]` table to run.
    script: String,
    /// Restart a running develop script on every run instead of keeping it.
    #[serde(default)]
    run_for_every_change: bool,
    #[serde(default)]
    ready_on_stdout: Option<String>,
    #[serde(default)]
    ready_after: Option<String>,
}

/// Runs a script from the package manifest.
///
/// For clean / build / deploy the script runs to completion. For develop it
/// is started as a long-lived child which is kept across runs unless
/// `run_for_every_change` is set.
#[derive(Debug)]
pub struct ScriptPlugin {
    script: String,
    command: String,
    run_for_every_change: bool,
    readiness: Readiness,
    running: Mutex<Option<Arc<ChildInstance>>>,
}

impl ScriptPlugin {
    pub fn from_options(package: &Package, options: &toml::Table) -> Result<Self> {
        let options: ScriptOptions = parse_options(SCRIPT, package, options)?;

        let command = package.scripts.get(&options.script).cloned().ok_or_else(|| {
            MonodevError::ConfigError(format!(
                "package \"{}\" has no script \"{}\" in its manifest",
                package.name, options.script
            ))
        })?;

        let readiness = readiness_from(
            package,
            options.ready_on_stdout.as_deref(),
            options.ready_after.as_deref(),
        )?;

        Ok(Self {
            script: options.script,
            command,
            run_for_every_change: options.run_for_every_change,
            readiness,
            running: Mutex::new(None),
        })
    }

    async fn run_once(&self, package: &Package) -> Result<()> {
        debug!(package = %package.name, script = %self.script, "running script");
        run_to_completion(&package.name, &self.command, &package.paths.root).await
    }

    async fn develop_inner(&self, package: &Package) -> Result<Arc<dyn DevelopInstance>> {
        let mut running = self.running.lock().await;

        if let Some(existing) = running.as_ref() {
            if existing.is_running() && !self.run_for_every_change {
                debug!(package = %package.name, script = %self.script, "script already running");
                return Ok(Arc::clone(existing) as Arc<dyn DevelopInstance>);
            }
        }

        if let Some(previous) = running.take() {
            info!(package = %package.name, script = %self.script, "restarting script");
            previous.kill_child().await?;
        }

        let child = spawn_long_lived(
            &package.name,
            &self.command,
            &package.paths.root,
            self.readiness.clone(),
        )
        .await?;
        let child = Arc::new(child);
        *running = Some(Arc::clone(&child));

        Ok(child as Arc<dyn DevelopInstance>)
    }
}

impl Plugin for ScriptPlugin {
    fn name(&self) -> &str {
        SCRIPT
    }

    fn clean<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        Box::pin(self.run_once(package))
    }

    fn build<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        Box::pin(self.run_once(package))
    }

    fn develop<'a>(
        &'a self,
        package: &'a Package,
        _ctx: DevelopContext<'a>,
    ) -> PluginFuture<'a, Arc<dyn DevelopInstance>> {
        Box::pin(self.develop_inner(package))
    }

    fn deploy<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        Box::pin(self.run_once(package))
    }
}
