// src/commands/mod.rs

//! Top-level commands: `develop`, `build`, `clean`, `deploy` and `graph`.

pub mod build;
pub mod clean;
pub mod deploy;
pub mod develop;
pub mod graph;

use std::path::Path;

use tracing::{debug, info};

use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::{MonodevError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::{PackageGraph, build_graph};
use crate::package::{Package, discover_packages};
use crate::plugin::{PackagePlugins, Plugin, PluginRegistry, PluginResolver};
use crate::types::CommandKind;

pub use build::build;
pub use clean::clean;
pub use deploy::deploy;
pub use develop::develop;
pub use graph::write_graph;

/// Everything a command needs: validated config, the package graph and the
/// plugin resolver. Built once per process.
#[derive(Debug)]
pub struct Workspace {
    pub config: ConfigFile,
    pub graph: PackageGraph,
    pub plugins: PluginResolver,
}

impl Workspace {
    /// Load the config at `config_path` and discover its packages.
    pub fn load(config_path: &Path) -> Result<Self> {
        Self::load_with(config_path, &RealFileSystem, PluginRegistry::with_builtins())
    }

    pub fn load_with(
        config_path: &Path,
        fs: &dyn FileSystem,
        registry: PluginRegistry,
    ) -> Result<Self> {
        let config = load_and_validate(config_path)?;
        let raw_packages = discover_packages(fs, &config)?;
        let graph = build_graph(raw_packages, config.configured_packages())?;
        info!(packages = graph.len(), "workspace loaded");
        Ok(Self::from_parts(config, graph, registry))
    }

    pub fn from_parts(config: ConfigFile, graph: PackageGraph, registry: PluginRegistry) -> Self {
        Self {
            config,
            graph,
            plugins: PluginResolver::new(registry),
        }
    }

    /// Resolve the plugins of every package in `graph`, failing on the first
    /// configuration problem.
    pub fn resolve_all(&self, graph: &PackageGraph) -> Result<Vec<(Package, PackagePlugins)>> {
        graph
            .ordered()
            .map(|pkg| -> Result<(Package, PackagePlugins)> {
                Ok((pkg.clone(), self.plugins.resolve(pkg)?))
            })
            .collect()
    }
}

/// Run a one-shot capability of `plugin` for `package`.
pub(crate) async fn run_capability(
    plugin: &dyn Plugin,
    command: CommandKind,
    package: &Package,
) -> Result<()> {
    match command {
        CommandKind::Clean => plugin.clean(package).await,
        CommandKind::Build => plugin.build(package).await,
        CommandKind::Deploy => plugin.deploy(package).await,
        CommandKind::Develop => Err(MonodevError::package(
            package.name.clone(),
            "develop is not a one-shot command",
        )),
    }
}

/// Run `command` for every package of `graph` that has a plugin for it,
/// one at a time in build order. Stops at the first failure.
///
/// Returns how many packages were processed.
pub(crate) async fn run_serially(
    workspace: &Workspace,
    graph: &PackageGraph,
    command: CommandKind,
) -> Result<usize> {
    let resolved = workspace.resolve_all(graph)?;

    let mut processed = 0;
    for (package, plugins) in resolved.iter() {
        let Some(plugin) = plugins.for_command(command) else {
            debug!(package = %package.name, %command, "no plugin; skipping");
            continue;
        };

        info!(package = %package.name, %command, plugin = plugin.name(), "running");
        run_capability(plugin.as_ref(), command, package).await?;
        processed += 1;
    }

    Ok(processed)
}
