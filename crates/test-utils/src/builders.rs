#![allow(dead_code)]

use std::path::PathBuf;

use monodev::config::{ConfigFile, PluginRef, RawConfigFile};
use monodev::graph::{PackageGraph, build_graph};
use monodev::package::RawPackage;

/// Builder for `RawPackage`.
pub struct RawPackageBuilder {
    package: RawPackage,
}

impl RawPackageBuilder {
    /// Package rooted at `packages/<name>`.
    pub fn new(name: &str) -> Self {
        Self {
            package: RawPackage::new(name, PathBuf::from("packages").join(name)),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.package.root = root.into();
        self
    }

    pub fn dep(mut self, name: &str) -> Self {
        self.package.dependencies.insert(name.to_string());
        self
    }

    pub fn dev_dep(mut self, name: &str) -> Self {
        self.package.dev_dependencies.insert(name.to_string());
        self
    }

    pub fn soft_dep(mut self, name: &str) -> Self {
        self.package.config.soft_dependencies.push(name.to_string());
        self
    }

    pub fn script(mut self, name: &str, cmd: &str) -> Self {
        self.package.scripts.insert(name.to_string(), cmd.to_string());
        self
    }

    pub fn build_plugin(mut self, plugin: PluginRef) -> Self {
        self.package.config.build_plugin = Some(plugin);
        self
    }

    pub fn develop_plugin(mut self, plugin: PluginRef) -> Self {
        self.package.config.develop_plugin = Some(plugin);
        self
    }

    pub fn clean_plugin(mut self, plugin: PluginRef) -> Self {
        self.package.config.clean_plugin = Some(plugin);
        self
    }

    pub fn deploy_plugin(mut self, plugin: PluginRef) -> Self {
        self.package.config.deploy_plugin = Some(plugin);
        self
    }

    pub fn disable_watching(mut self) -> Self {
        self.package.config.disable_src_watching = true;
        self
    }

    pub fn build(self) -> RawPackage {
        self.package
    }
}

/// Builder for `PackageGraph`. Packages keep the order they are added in,
/// which acts as discovery order.
#[derive(Default)]
pub struct GraphBuilder {
    packages: Vec<RawPackage>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with the given production dependencies.
    pub fn package(mut self, name: &str, deps: &[&str]) -> Self {
        let mut builder = RawPackageBuilder::new(name);
        for dep in deps {
            builder = builder.dep(dep);
        }
        self.packages.push(builder.build());
        self
    }

    pub fn raw(mut self, package: RawPackage) -> Self {
        self.packages.push(package);
        self
    }

    pub fn into_raw(self) -> Vec<RawPackage> {
        self.packages
    }

    pub fn try_build(self) -> monodev::errors::Result<PackageGraph> {
        build_graph(self.packages, std::iter::empty())
    }

    pub fn build(self) -> PackageGraph {
        self.try_build().expect("Failed to build package graph from builder")
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    root: PathBuf,
}

impl ConfigFileBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: RawConfigFile::default(),
            root: root.into(),
        }
    }

    pub fn from_toml(root: impl Into<PathBuf>, toml_src: &str) -> Self {
        Self {
            config: toml::from_str(toml_src).expect("Failed to parse config TOML"),
            root: root.into(),
        }
    }

    pub fn package_sources(mut self, sources: &[&str]) -> Self {
        self.config.config.package_sources = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn grace_period(mut self, period: &str) -> Self {
        self.config.config.shutdown_grace_period = period.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::from_raw(self.config, self.root)
            .expect("Failed to build valid config from builder")
    }
}
