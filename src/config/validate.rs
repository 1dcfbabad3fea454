// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use globset::GlobBuilder;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, PluginRef, RawConfigFile};
use crate::errors::{MonodevError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = MonodevError;

    /// Validate a raw config whose paths are relative to the current directory.
    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ConfigFile::from_raw(raw, PathBuf::from("."))
    }
}

impl ConfigFile {
    /// Validate `raw` and anchor it at `root_dir`.
    pub fn from_raw(raw: RawConfigFile, root_dir: PathBuf) -> Result<Self> {
        let grace = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw, root_dir, grace))
    }
}

/// Run every check and return the parsed shutdown grace period.
fn validate_raw_config(cfg: &RawConfigFile) -> Result<Duration> {
    validate_package_sources(cfg)?;
    let grace = validate_grace_period(cfg)?;
    validate_packages(cfg)?;
    Ok(grace)
}

fn validate_package_sources(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.package_sources.is_empty() {
        return Err(MonodevError::ConfigError(
            "[config].package_sources must contain at least one glob".to_string(),
        ));
    }

    for source in cfg.config.package_sources.iter() {
        GlobBuilder::new(source).literal_separator(true).build().map_err(|e| {
            MonodevError::ConfigError(format!("invalid package source glob '{source}': {e}"))
        })?;
    }
    Ok(())
}

/// Upper bound for `[config].shutdown_grace_period`.
const MAX_GRACE_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

fn validate_grace_period(cfg: &RawConfigFile) -> Result<Duration> {
    let raw = &cfg.config.shutdown_grace_period;
    let grace = parse_duration(raw).map_err(|e| {
        MonodevError::ConfigError(format!("[config].shutdown_grace_period: {e}"))
    })?;
    if grace.is_zero() {
        return Err(MonodevError::ConfigError(
            "[config].shutdown_grace_period must be greater than zero".to_string(),
        ));
    }
    if grace > MAX_GRACE_PERIOD {
        return Err(MonodevError::ConfigError(format!(
            "[config].shutdown_grace_period must be at most {}s, got '{raw}'",
            MAX_GRACE_PERIOD.as_secs()
        )));
    }
    Ok(grace)
}

fn validate_packages(cfg: &RawConfigFile) -> Result<()> {
    for (name, pkg) in cfg.package.iter() {
        let plugins = [
            ("clean_plugin", &pkg.clean_plugin),
            ("build_plugin", &pkg.build_plugin),
            ("develop_plugin", &pkg.develop_plugin),
            ("deploy_plugin", &pkg.deploy_plugin),
        ];
        for (field, plugin) in plugins {
            if let Some(plugin) = plugin {
                validate_plugin_ref(name, field, plugin)?;
            }
        }

        if pkg.soft_dependencies.iter().any(|dep| dep == name) {
            return Err(MonodevError::ConfigError(format!(
                "package '{name}' cannot list itself in `soft_dependencies`"
            )));
        }

        if pkg.output_dir.trim().is_empty() {
            return Err(MonodevError::ConfigError(format!(
                "package '{name}' has an empty `output_dir`"
            )));
        }
    }
    Ok(())
}

fn validate_plugin_ref(package: &str, field: &str, plugin: &PluginRef) -> Result<()> {
    if plugin.name().trim().is_empty() {
        return Err(MonodevError::ConfigError(format!(
            "package '{package}' has an empty plugin name in `{field}`"
        )));
    }
    Ok(())
}
