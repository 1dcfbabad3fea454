// src/plugin/develop_build.rs

use std::sync::Arc;

use crate::errors::{MonodevError, Result};
use crate::package::Package;
use crate::plugin::{DevelopContext, DevelopInstance, NoopInstance, Plugin, PluginFuture};

pub const DEVELOP_BUILD: &str = "develop-build";

/// Develops a package by running its build plugin on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevelopBuildPlugin;

async fn build_once(package: &Package, ctx: DevelopContext<'_>) -> Result<Arc<dyn DevelopInstance>> {
    let build = ctx.build_plugin.ok_or_else(|| {
        MonodevError::package(
            package.name.clone(),
            format!("\"{DEVELOP_BUILD}\" needs a build plugin"),
        )
    })?;
    build.build(package).await?;
    Ok(Arc::new(NoopInstance))
}

impl Plugin for DevelopBuildPlugin {
    fn name(&self) -> &str {
        DEVELOP_BUILD
    }

    fn develop<'a>(
        &'a self,
        package: &'a Package,
        ctx: DevelopContext<'a>,
    ) -> PluginFuture<'a, Arc<dyn DevelopInstance>> {
        Box::pin(build_once(package, ctx))
    }
}
