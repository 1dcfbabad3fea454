// src/package/mod.rs

//! Monorepo packages: manifests, discovery and the resolved package record.

pub mod discover;
pub mod manifest;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::model::PackageConfig;
use crate::engine::PackageName;

pub use discover::{discover_packages, resolve_package_roots};
pub use manifest::{MANIFEST_FILE_NAME, PackageManifest, read_manifest};

/// A discovered package before the dependency graph has been resolved.
///
/// Dependency names are exactly what the manifest declares; names that do not
/// belong to the monorepo are dropped when the graph is built.
#[derive(Debug, Clone)]
pub struct RawPackage {
    pub name: PackageName,
    pub version: String,
    pub root: PathBuf,
    pub dependencies: BTreeSet<String>,
    pub dev_dependencies: BTreeSet<String>,
    pub scripts: BTreeMap<String, String>,
    pub config: PackageConfig,
}

impl RawPackage {
    /// A package rooted at `root` with default config and no dependencies.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: "0.0.0".to_string(),
            root: root.into(),
            dependencies: BTreeSet::new(),
            dev_dependencies: BTreeSet::new(),
            scripts: BTreeMap::new(),
            config: PackageConfig::default(),
        }
    }
}

/// Filesystem locations of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePaths {
    pub root: PathBuf,
    pub src: PathBuf,
    pub build_output: PathBuf,
}

impl PackagePaths {
    pub fn new(root: &Path, config: &PackageConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            src: root.join(&config.src_dir),
            build_output: root.join(&config.output_dir),
        }
    }
}

/// A node of the resolved dependency graph.
///
/// Every dependency set only contains names of other monorepo packages.
/// Immutable once the graph has been built.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: PackageName,
    pub version: String,
    pub paths: PackagePaths,
    pub dependencies: BTreeSet<PackageName>,
    pub dev_dependencies: BTreeSet<PackageName>,
    pub soft_dependencies: BTreeSet<PackageName>,
    /// Packages that list this one in any of the three sets above.
    pub dependants: BTreeSet<PackageName>,
    pub all_dependants: BTreeSet<PackageName>,
    pub all_dependencies: BTreeSet<PackageName>,
    pub scripts: BTreeMap<String, String>,
    pub config: PackageConfig,
}

impl Package {
    /// Union of production, dev and soft dependencies.
    pub fn direct_dependencies(&self) -> impl Iterator<Item = &PackageName> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .chain(self.soft_dependencies.iter())
    }

    pub fn has_dependencies(&self) -> bool {
        self.direct_dependencies().next().is_some()
    }

    pub fn watching_disabled(&self) -> bool {
        self.config.disable_src_watching
    }
}
