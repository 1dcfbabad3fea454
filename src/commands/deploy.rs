// src/commands/deploy.rs

use tracing::info;

use crate::cli::PackageFilterArgs;
use crate::commands::{Workspace, run_serially};
use crate::errors::{MonodevError, Result};
use crate::exec::{HookStage, run_hook};
use crate::types::CommandKind;

/// Deploy every selected package that has a deploy plugin.
pub async fn deploy(workspace: &Workspace, filter: &PackageFilterArgs) -> Result<()> {
    let graph = workspace.graph.filter(&filter.packages, filter.exact)?;

    let deployable = workspace
        .resolve_all(&graph)?
        .iter()
        .filter(|(_, plugins)| plugins.deploy.is_some())
        .count();
    if deployable == 0 {
        return Err(MonodevError::ConfigError(
            "no packages with a deploy plugin were selected".to_string(),
        ));
    }

    run_hook(&workspace.config, CommandKind::Deploy, HookStage::Pre).await?;
    let deployed = run_serially(workspace, &graph, CommandKind::Deploy).await?;
    run_hook(&workspace.config, CommandKind::Deploy, HookStage::Post).await?;

    info!(packages = deployed, "deploy finished");
    Ok(())
}
