// src/plugin/registry.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::model::PluginRef;
use crate::engine::PackageName;
use crate::errors::{MonodevError, Result};
use crate::package::Package;
use crate::plugin::Plugin;
use crate::plugin::clean_build::{CLEAN_BUILD, CleanBuildPlugin};
use crate::plugin::develop_build::{DEVELOP_BUILD, DevelopBuildPlugin};
use crate::plugin::script::{SCRIPT, ScriptPlugin};
use crate::plugin::server::{SERVER, ServerPlugin};
use crate::types::CommandKind;

/// Creates a plugin bound to one package and its options.
pub type PluginFactory =
    Arc<dyn Fn(&Package, &toml::Table) -> Result<Arc<dyn Plugin>> + Send + Sync>;

/// Mapping from plugin identifier to factory.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort();
        f.debug_struct("PluginRegistry").field("plugins", &names).finish()
    }
}

impl PluginRegistry {
    /// Registry without any plugins.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(SCRIPT, |pkg, options| {
            Ok(Arc::new(ScriptPlugin::from_options(pkg, options)?) as Arc<dyn Plugin>)
        });
        registry.register(SERVER, |pkg, options| {
            Ok(Arc::new(ServerPlugin::from_options(pkg, options)?) as Arc<dyn Plugin>)
        });
        registry.register(CLEAN_BUILD, |_, _| Ok(Arc::new(CleanBuildPlugin) as Arc<dyn Plugin>));
        registry.register(DEVELOP_BUILD, |_, _| {
            Ok(Arc::new(DevelopBuildPlugin) as Arc<dyn Plugin>)
        });
        registry
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Package, &toml::Table) -> Result<Arc<dyn Plugin>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the plugin `plugin` refers to for `package`.
    pub fn create(&self, plugin: &PluginRef, package: &Package) -> Result<Arc<dyn Plugin>> {
        let factory = self.factories.get(plugin.name()).ok_or_else(|| {
            MonodevError::ConfigError(format!(
                "could not resolve plugin \"{}\" for package \"{}\"",
                plugin.name(),
                package.name
            ))
        })?;
        factory(package, &plugin.options())
    }
}

/// The plugins of one package, one per command.
#[derive(Debug, Clone, Default)]
pub struct PackagePlugins {
    pub clean: Option<Arc<dyn Plugin>>,
    pub build: Option<Arc<dyn Plugin>>,
    pub develop: Option<Arc<dyn Plugin>>,
    pub deploy: Option<Arc<dyn Plugin>>,
}

impl PackagePlugins {
    pub fn for_command(&self, command: CommandKind) -> Option<&Arc<dyn Plugin>> {
        match command {
            CommandKind::Clean => self.clean.as_ref(),
            CommandKind::Build => self.build.as_ref(),
            CommandKind::Develop => self.develop.as_ref(),
            CommandKind::Deploy => self.deploy.as_ref(),
        }
    }
}

/// Resolves and caches the plugins of each package.
///
/// Built once per process; every package is resolved at most once, so
/// stateful plugins (e.g. the long-lived child of a `script` develop plugin)
/// are shared between everything that asks for them.
#[derive(Debug)]
pub struct PluginResolver {
    registry: PluginRegistry,
    cache: Mutex<HashMap<PackageName, PackagePlugins>>,
}

impl PluginResolver {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Plugins of `package`, applying the defaults:
    /// - a build plugin without a clean plugin implies `clean-build`;
    /// - a build plugin without a develop plugin implies `develop-build`.
    pub fn resolve(&self, package: &Package) -> Result<PackagePlugins> {
        if let Some(cached) = self.cache.lock().ok().and_then(|c| c.get(&package.name).cloned()) {
            return Ok(cached);
        }

        let config = &package.config;
        let create = |plugin: &Option<PluginRef>| -> Result<Option<Arc<dyn Plugin>>> {
            plugin
                .as_ref()
                .map(|p| self.registry.create(p, package))
                .transpose()
        };

        let build = create(&config.build_plugin)?;
        let mut clean = create(&config.clean_plugin)?;
        let mut develop = create(&config.develop_plugin)?;
        let deploy = create(&config.deploy_plugin)?;

        if build.is_some() {
            if clean.is_none() {
                clean = Some(self.registry.create(&PluginRef::named(CLEAN_BUILD), package)?);
            }
            if develop.is_none() {
                develop = Some(self.registry.create(&PluginRef::named(DEVELOP_BUILD), package)?);
            }
        }

        let plugins = PackagePlugins {
            clean,
            build,
            develop,
            deploy,
        };
        debug!(package = %package.name, ?plugins, "resolved plugins");

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(package.name.clone(), plugins.clone());
        }
        Ok(plugins)
    }
}
