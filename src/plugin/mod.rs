// src/plugin/mod.rs

//! Plugins implement what a package *does* for each command.
//!
//! A plugin is resolved per package from the `*_plugin` entries of its
//! config section (see [`registry`]). Every capability is optional; calling
//! one the plugin does not support fails with a package error.

pub mod clean_build;
pub mod develop_build;
pub mod registry;
pub mod script;
pub mod server;

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::RunReason;
use crate::errors::{MonodevError, Result};
use crate::package::Package;
use crate::watch::SourceWatcher;

pub use registry::{PackagePlugins, PluginFactory, PluginRegistry, PluginResolver};

/// Boxed future returned by plugin capabilities.
pub type PluginFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Handle to something a develop run left running.
pub trait DevelopInstance: Send + Sync + Debug {
    /// Stop it and wait until it is gone.
    fn kill(&self) -> PluginFuture<'_, ()>;
}

/// Instance for develop runs that leave nothing running.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInstance;

impl DevelopInstance for NoopInstance {
    fn kill(&self) -> PluginFuture<'_, ()> {
        Box::pin(std::future::ready(Ok(())))
    }
}

/// What a develop run is told about why it runs.
#[derive(Debug, Clone, Copy)]
pub struct DevelopContext<'a> {
    pub reason: RunReason,
    /// Set when `reason` is [`RunReason::DependencyChanged`].
    pub changed_dependency: Option<&'a str>,
    /// The package's own source watcher, for plugins that bring their own
    /// watch mode and want to pause it.
    pub watcher: &'a SourceWatcher,
    /// The package's build plugin, if it has one.
    pub build_plugin: Option<&'a dyn Plugin>,
}

/// A concrete plugin implementation, bound to one package's options.
pub trait Plugin: Send + Sync + Debug {
    /// Identifier the plugin was registered under.
    fn name(&self) -> &str;

    fn clean<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        unsupported(self.name(), "clean", package)
    }

    fn build<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        unsupported(self.name(), "build", package)
    }

    fn develop<'a>(
        &'a self,
        package: &'a Package,
        _ctx: DevelopContext<'a>,
    ) -> PluginFuture<'a, Arc<dyn DevelopInstance>> {
        unsupported(self.name(), "develop", package)
    }

    fn deploy<'a>(&'a self, package: &'a Package) -> PluginFuture<'a, ()> {
        unsupported(self.name(), "deploy", package)
    }
}

fn unsupported<'a, T: Send + 'a>(plugin: &str, capability: &str, package: &Package) -> PluginFuture<'a, T> {
    let err = MonodevError::package(
        package.name.clone(),
        format!("\"{capability}\" is not supported by the \"{plugin}\" plugin"),
    );
    Box::pin(std::future::ready(Err(err)))
}

/// Deserialize plugin `options` into `T`, reporting problems as config errors.
pub(crate) fn parse_options<T: serde::de::DeserializeOwned>(
    plugin: &str,
    package: &Package,
    options: &toml::Table,
) -> Result<T> {
    toml::Value::Table(options.clone()).try_into::<T>().map_err(|e| {
        MonodevError::ConfigError(format!(
            "invalid options for plugin \"{plugin}\" of package \"{}\": {e}",
            package.name
        ))
    })
}

/// Build a [`Readiness`] from the `ready_on_stdout` / `ready_after` options.
///
/// [`Readiness`]: crate::exec::Readiness
pub(crate) fn readiness_from(
    package: &Package,
    ready_on_stdout: Option<&str>,
    ready_after: Option<&str>,
) -> Result<crate::exec::Readiness> {
    let on_stdout = ready_on_stdout
        .map(regex::Regex::new)
        .transpose()
        .map_err(|e| {
            MonodevError::ConfigError(format!(
                "package \"{}\": invalid ready_on_stdout regex: {e}",
                package.name
            ))
        })?;

    let after = ready_after
        .map(crate::config::parse_duration)
        .transpose()
        .map_err(|e| {
            MonodevError::ConfigError(format!(
                "package \"{}\": invalid ready_after: {e}",
                package.name
            ))
        })?;

    Ok(crate::exec::Readiness { on_stdout, after })
}
