// src/graph/build.rs

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::engine::PackageName;
use crate::errors::{MonodevError, Result};
use crate::graph::{PackageGraph, collect_closure, order_by_dependencies};
use crate::package::{Package, PackagePaths, RawPackage};
use crate::types::Relation;

/// Resolve raw packages into a [`PackageGraph`].
///
/// - Declared dependencies that are not monorepo packages are dropped.
/// - Unknown soft dependencies are dropped with a warning.
/// - `configured` names (packages with an explicit config section) must all
///   have been discovered.
///
/// Fails on duplicate package names, unknown configured packages and
/// dependency cycles.
pub fn build_graph<'a>(
    raw_packages: Vec<RawPackage>,
    configured: impl IntoIterator<Item = &'a str>,
) -> Result<PackageGraph> {
    let mut known: BTreeSet<PackageName> = BTreeSet::new();
    for raw in raw_packages.iter() {
        if !known.insert(raw.name.clone()) {
            return Err(MonodevError::ConfigError(format!(
                "package name '{}' is used by more than one package (second one at {:?})",
                raw.name, raw.root
            )));
        }
    }

    for name in configured {
        if !known.contains(name) {
            return Err(MonodevError::ConfigError(format!(
                "package '{name}' is configured but could not be found in the package sources"
            )));
        }
    }

    let mut packages: Vec<Package> = raw_packages
        .into_iter()
        .map(|raw| resolve_package(raw, &known))
        .collect();

    // Inverse of every dependency kind.
    let mut dependants: HashMap<PackageName, BTreeSet<PackageName>> = HashMap::new();
    for pkg in packages.iter() {
        for dep in pkg.direct_dependencies() {
            dependants
                .entry(dep.clone())
                .or_default()
                .insert(pkg.name.clone());
        }
    }
    for pkg in packages.iter_mut() {
        pkg.dependants = dependants.remove(&pkg.name).unwrap_or_default();
    }

    let order = order_by_dependencies(&packages)?;

    let mut by_name: HashMap<PackageName, Package> = packages
        .into_iter()
        .map(|p| (p.name.clone(), p))
        .collect();
    fill_closures(&mut by_name);

    debug!(order = ?order, "resolved package build order");

    Ok(PackageGraph::from_parts(by_name, order))
}

fn resolve_package(raw: RawPackage, known: &BTreeSet<PackageName>) -> Package {
    let in_repo = |names: &BTreeSet<String>| -> BTreeSet<PackageName> {
        names.iter().filter(|n| known.contains(*n)).cloned().collect()
    };

    let dependencies = in_repo(&raw.dependencies);
    let dev_dependencies = in_repo(&raw.dev_dependencies);

    let mut soft_dependencies = BTreeSet::new();
    for soft in raw.config.soft_dependencies.iter() {
        if known.contains(soft) {
            soft_dependencies.insert(soft.clone());
        } else {
            warn!(
                package = %raw.name,
                soft_dependency = %soft,
                "ignoring soft dependency that is not a monorepo package"
            );
        }
    }

    Package {
        paths: PackagePaths::new(&raw.root, &raw.config),
        name: raw.name,
        version: raw.version,
        dependencies,
        dev_dependencies,
        soft_dependencies,
        dependants: BTreeSet::new(),
        all_dependants: BTreeSet::new(),
        all_dependencies: BTreeSet::new(),
        scripts: raw.scripts,
        config: raw.config,
    }
}

/// Populate `all_dependants` / `all_dependencies` from the direct edges.
pub(crate) fn fill_closures(packages: &mut HashMap<PackageName, Package>) {
    let closures: Vec<(PackageName, BTreeSet<PackageName>, BTreeSet<PackageName>)> = packages
        .keys()
        .map(|name| {
            (
                name.clone(),
                collect_closure(packages, name, Relation::Dependants),
                collect_closure(packages, name, Relation::Dependencies),
            )
        })
        .collect();

    for (name, all_dependants, all_dependencies) in closures {
        if let Some(pkg) = packages.get_mut(&name) {
            pkg.all_dependants = all_dependants;
            pkg.all_dependencies = all_dependencies;
        }
    }
}
