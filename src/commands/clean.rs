// src/commands/clean.rs

use tracing::info;

use crate::cli::PackageFilterArgs;
use crate::commands::{Workspace, run_serially};
use crate::errors::Result;
use crate::exec::{HookStage, run_hook};
use crate::types::CommandKind;

/// Clean the selected packages, one at a time.
pub async fn clean(workspace: &Workspace, filter: &PackageFilterArgs) -> Result<()> {
    let graph = workspace.graph.filter(&filter.packages, filter.exact)?;

    run_hook(&workspace.config, CommandKind::Clean, HookStage::Pre).await?;
    let cleaned = run_serially(workspace, &graph, CommandKind::Clean).await?;
    run_hook(&workspace.config, CommandKind::Clean, HookStage::Post).await?;

    info!(packages = cleaned, "clean finished");
    Ok(())
}
