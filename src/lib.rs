// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod package;
pub mod plugin;
pub mod types;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::commands::Workspace;

/// High-level entry point used by `main.rs`.
///
/// Loads the workspace (config, packages, dependency graph) and runs the
/// selected command. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = PathBuf::from(&args.config);
    let workspace = Workspace::load(&config_path)?;
    debug!(order = ?workspace.graph.names(), "build order");

    match &args.command {
        Command::Develop(develop_args) => {
            let status = commands::develop(&workspace, develop_args).await?;
            Ok(status.exit_code())
        }
        Command::Build(filter) => {
            commands::build(&workspace, filter).await?;
            Ok(0)
        }
        Command::Clean(filter) => {
            commands::clean(&workspace, filter).await?;
            Ok(0)
        }
        Command::Deploy(filter) => {
            commands::deploy(&workspace, filter).await?;
            Ok(0)
        }
        Command::Graph => {
            commands::write_graph(&workspace.graph, &mut std::io::stdout().lock())?;
            Ok(0)
        }
    }
}
