// src/plugin/clean_build.rs

use std::io::ErrorKind;

use tracing::info;

use crate::errors::Result;
use crate::package::Package;
use crate::plugin::{Plugin, PluginFuture};

pub const CLEAN_BUILD: &str = "clean-build";

/// Removes the package's build output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanBuildPlugin;

async fn remove_build_output(package: &Package) -> Result<()> {
    let dir = &package.paths.build_output;
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!(package = %package.name, dir = ?dir, "removed build output");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("removing build output {:?}", dir))
            .into()),
    }
}

impl Plugin for CleanBuildPlugin {
    fn name(&self) -> &str {
        CLEAN_BUILD
    }

    fn clean<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        Box::pin(remove_build_output(package))
    }
}
