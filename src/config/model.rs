// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::CommandKind;

/// Top-level configuration as read from `Monodev.toml`, before validation.
///
/// ```toml
/// [config]
/// package_sources = ["packages/*"]
/// shutdown_grace_period = "10s"
///
/// [hooks.develop]
/// pre = "docker compose up -d"
/// post = "docker compose down"
///
/// [package.api]
/// build_plugin = "script"
/// develop_plugin = { name = "server", options = { cmd = "node build/index.js" } }
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Workspace-wide settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Shell commands to run around each top-level command.
    #[serde(default)]
    pub hooks: BTreeMap<CommandKind, HookConfig>,

    /// Per-package settings from `[package.<name>]`, keyed by manifest name.
    #[serde(default)]
    pub package: BTreeMap<String, PackageConfig>,
}

/// Validated configuration.
///
/// Only constructed through [`ConfigFile::from_raw`] / `TryFrom`, which run
/// the checks in `config::validate`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    settings: ConfigSection,
    hooks: BTreeMap<CommandKind, HookConfig>,
    packages: BTreeMap<String, PackageConfig>,
    root_dir: PathBuf,
    shutdown_grace_period: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        raw: RawConfigFile,
        root_dir: PathBuf,
        shutdown_grace_period: Duration,
    ) -> Self {
        Self {
            settings: raw.config,
            hooks: raw.hooks,
            packages: raw.package,
            root_dir,
            shutdown_grace_period,
        }
    }

    pub fn package_sources(&self) -> &[String] {
        &self.settings.package_sources
    }

    /// Directory that package sources and hooks are resolved against.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn shutdown_grace_period(&self) -> Duration {
        self.shutdown_grace_period
    }

    pub fn hook(&self, command: CommandKind) -> Option<&HookConfig> {
        self.hooks.get(&command)
    }

    /// Package config for `name`, or the defaults if it has no section.
    pub fn package_config(&self, name: &str) -> PackageConfig {
        self.packages.get(name).cloned().unwrap_or_default()
    }

    /// Names that have an explicit `[package.<name>]` section.
    pub fn configured_packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(|s| s.as_str())
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Globs (relative to the config directory) whose matches are package roots.
    #[serde(default = "default_package_sources")]
    pub package_sources: Vec<String>,

    /// Upper bound on graceful shutdown before the process is forced out.
    #[serde(default = "default_shutdown_grace_period")]
    pub shutdown_grace_period: String,
}

fn default_package_sources() -> Vec<String> {
    vec!["packages/*".to_string()]
}

fn default_shutdown_grace_period() -> String {
    "10s".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            package_sources: default_package_sources(),
            shutdown_grace_period: default_shutdown_grace_period(),
        }
    }
}

/// `[hooks.<command>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookConfig {
    #[serde(default)]
    pub pre: Option<String>,
    #[serde(default)]
    pub post: Option<String>,
}

/// `[package.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    /// Source directory, relative to the package root.
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Build output directory, relative to the package root. Never watched.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Turn the source watcher for this package into a no-op.
    #[serde(default)]
    pub disable_src_watching: bool,

    /// Ordering-only dependencies on other monorepo packages.
    #[serde(default)]
    pub soft_dependencies: Vec<String>,

    #[serde(default)]
    pub clean_plugin: Option<PluginRef>,
    #[serde(default)]
    pub build_plugin: Option<PluginRef>,
    #[serde(default)]
    pub develop_plugin: Option<PluginRef>,
    #[serde(default)]
    pub deploy_plugin: Option<PluginRef>,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_output_dir() -> String {
    "build".to_string()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            output_dir: default_output_dir(),
            disable_src_watching: false,
            soft_dependencies: Vec::new(),
            clean_plugin: None,
            build_plugin: None,
            develop_plugin: None,
            deploy_plugin: None,
        }
    }
}

/// Reference to a plugin: either a bare identifier or an identifier with
/// plugin-specific options.
///
/// ```toml
/// build_plugin = "script"
/// develop_plugin = { name = "script", options = { script = "dev" } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PluginRef {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        options: toml::Table,
    },
}

impl PluginRef {
    pub fn named(name: impl Into<String>) -> Self {
        PluginRef::Name(name.into())
    }

    pub fn with_options(name: impl Into<String>, options: toml::Table) -> Self {
        PluginRef::Detailed {
            name: name.into(),
            options,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PluginRef::Name(name) => name,
            PluginRef::Detailed { name, .. } => name,
        }
    }

    pub fn options(&self) -> toml::Table {
        match self {
            PluginRef::Name(_) => toml::Table::new(),
            PluginRef::Detailed { options, .. } => options.clone(),
        }
    }
}
