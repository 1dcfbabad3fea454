// src/exec/hooks.rs

use std::fmt;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::exec::process::run_to_completion;
use crate::types::CommandKind;

/// Which end of a command a hook runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Pre,
    Post,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Pre => f.write_str("pre"),
            HookStage::Post => f.write_str("post"),
        }
    }
}

/// Run the configured `stage` hook of `command` from the workspace root.
///
/// Returns `Ok(false)` when no such hook is configured.
pub async fn run_hook(config: &ConfigFile, command: CommandKind, stage: HookStage) -> Result<bool> {
    let hook = config.hook(command).and_then(|h| match stage {
        HookStage::Pre => h.pre.as_deref(),
        HookStage::Post => h.post.as_deref(),
    });

    let Some(cmd) = hook else {
        debug!(%command, %stage, "no hook configured");
        return Ok(false);
    };

    let label = format!("{stage}-{command} hook");
    run_to_completion(&label, cmd, config.root_dir()).await?;
    Ok(true)
}
