// src/package/manifest.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::errors::{MonodevError, Result};
use crate::fs::FileSystem;

/// File that marks a directory as a package root.
pub const MANIFEST_FILE_NAME: &str = "package.toml";

/// `package.toml` contents.
///
/// ```toml
/// name = "api"
/// version = "0.3.1"
///
/// [dependencies]
/// shared = "*"
///
/// [scripts]
/// build = "tsc -p ."
/// ```
///
/// Only the keys of the dependency tables matter.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub dependencies: BTreeMap<String, toml::Value>,

    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl PackageManifest {
    pub fn dependency_names(&self) -> BTreeSet<String> {
        self.dependencies.keys().cloned().collect()
    }

    pub fn dev_dependency_names(&self) -> BTreeSet<String> {
        self.dev_dependencies.keys().cloned().collect()
    }
}

/// Read and parse the manifest in `package_root`.
pub fn read_manifest(fs: &dyn FileSystem, package_root: &Path) -> Result<PackageManifest> {
    let path = package_root.join(MANIFEST_FILE_NAME);
    let contents = fs.read_to_string(&path).map_err(|e| {
        MonodevError::ConfigError(format!("could not read manifest {:?}: {e}", path))
    })?;

    let manifest: PackageManifest = toml::from_str(&contents).map_err(|e| {
        MonodevError::ConfigError(format!("invalid manifest {:?}: {e}", path))
    })?;

    if manifest.name.trim().is_empty() {
        return Err(MonodevError::ConfigError(format!(
            "manifest {:?} has an empty `name`",
            path
        )));
    }

    Ok(manifest)
}
