// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MonodevError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        MonodevError::ConfigError(format!("could not read config file {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// Package sources and hooks of the returned config are resolved against the
/// directory containing the file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::from_raw(raw_config, config_root_dir(path.as_ref()))
}

/// Figure out the workspace root for a config path.
///
/// - If the config path has a non-empty parent (e.g. "repo/Monodev.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Monodev.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
