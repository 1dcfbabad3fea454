// src/plugin/server.rs

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::Result;
use crate::exec::{ChildInstance, Readiness, spawn_long_lived};
use crate::package::Package;
use crate::plugin::{
    DevelopContext, DevelopInstance, Plugin, PluginFuture, parse_options, readiness_from,
};

pub const SERVER: &str = "server";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerOptions {
    /// Shell command that starts the server, run in the package root.
    cmd: String,
    #[serde(default)]
    ready_on_stdout: Option<String>,
    #[serde(default)]
    ready_after: Option<String>,
}

/// Develop-only plugin that (re)starts a server on every run.
#[derive(Debug)]
pub struct ServerPlugin {
    cmd: String,
    readiness: Readiness,
    running: Mutex<Option<Arc<ChildInstance>>>,
}

impl ServerPlugin {
    pub fn from_options(package: &Package, options: &toml::Table) -> Result<Self> {
        let options: ServerOptions = parse_options(SERVER, package, options)?;
        let readiness = readiness_from(
            package,
            options.ready_on_stdout.as_deref(),
            options.ready_after.as_deref(),
        )?;

        Ok(Self {
            cmd: options.cmd,
            readiness,
            running: Mutex::new(None),
        })
    }

    async fn restart(&self, package: &Package) -> Result<Arc<dyn DevelopInstance>> {
        let mut running = self.running.lock().await;

        if let Some(previous) = running.take() {
            info!(package = %package.name, "stopping previous server");
            previous.kill_child().await?;
        }

        let child = Arc::new(
            spawn_long_lived(
                &package.name,
                &self.cmd,
                &package.paths.root,
                self.readiness.clone(),
            )
            .await?,
        );
        *running = Some(Arc::clone(&child));
        info!(package = %package.name, "server running");

        Ok(child as Arc<dyn DevelopInstance>)
    }
}

impl Plugin for ServerPlugin {
    fn name(&self) -> &str {
        SERVER
    }

    fn develop<'a>(
        &'a self,
        package: &'a Package,
        _ctx: DevelopContext<'a>,
    ) -> PluginFuture<'a, Arc<dyn DevelopInstance>> {
        Box::pin(self.restart(package))
    }
}
