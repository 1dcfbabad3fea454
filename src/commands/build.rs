// src/commands/build.rs

use tracing::info;

use crate::cli::PackageFilterArgs;
use crate::commands::{Workspace, run_serially};
use crate::errors::Result;
use crate::exec::{HookStage, run_hook};
use crate::types::CommandKind;

/// Build the selected packages in build order, between the build hooks.
pub async fn build(workspace: &Workspace, filter: &PackageFilterArgs) -> Result<()> {
    let graph = workspace.graph.filter(&filter.packages, filter.exact)?;

    run_hook(&workspace.config, CommandKind::Build, HookStage::Pre).await?;
    let built = run_serially(workspace, &graph, CommandKind::Build).await?;
    run_hook(&workspace.config, CommandKind::Build, HookStage::Post).await?;

    info!(packages = built, "build finished");
    Ok(())
}
