// src/graph/mod.rs

//! The monorepo dependency graph.
//!
//! Built once at startup from discovered packages and never mutated after.
//! Besides direct edges it carries a build order in which every dependency
//! precedes its dependants.

pub mod build;
pub mod filter;
pub mod order;

use std::collections::{BTreeSet, HashMap};

use crate::engine::PackageName;
use crate::package::Package;
use crate::types::Relation;

pub use build::build_graph;
pub use order::order_by_dependencies;

static NO_PACKAGES: BTreeSet<PackageName> = BTreeSet::new();

/// Immutable set of packages plus their build order.
#[derive(Debug, Clone)]
pub struct PackageGraph {
    packages: HashMap<PackageName, Package>,
    order: Vec<PackageName>,
}

impl PackageGraph {
    pub(crate) fn from_parts(packages: HashMap<PackageName, Package>, order: Vec<PackageName>) -> Self {
        Self { packages, order }
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Package names in build order.
    pub fn names(&self) -> &[PackageName] {
        &self.order
    }

    /// Packages in build order.
    pub fn ordered(&self) -> impl Iterator<Item = &Package> {
        self.order.iter().filter_map(|name| self.packages.get(name))
    }

    /// Direct dependants of `name`; empty for unknown packages.
    pub fn dependants_of(&self, name: &str) -> &BTreeSet<PackageName> {
        self.packages
            .get(name)
            .map(|p| &p.dependants)
            .unwrap_or(&NO_PACKAGES)
    }

    /// Direct production, dev and soft dependencies of `name`.
    pub fn dependencies_of(&self, name: &str) -> BTreeSet<PackageName> {
        self.packages
            .get(name)
            .map(|p| p.direct_dependencies().cloned().collect())
            .unwrap_or_default()
    }

    /// Every package reachable from `name` along `relation`, excluding `name`.
    pub fn transitive_closure(&self, name: &str, relation: Relation) -> BTreeSet<PackageName> {
        collect_closure(&self.packages, name, relation)
    }
}

pub(crate) fn collect_closure(
    packages: &HashMap<PackageName, Package>,
    start: &str,
    relation: Relation,
) -> BTreeSet<PackageName> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![start.to_string()];

    while let Some(current) = stack.pop() {
        let Some(pkg) = packages.get(&current) else {
            continue;
        };
        let next: Vec<&PackageName> = match relation {
            Relation::Dependants => pkg.dependants.iter().collect(),
            Relation::Dependencies => pkg.direct_dependencies().collect(),
        };
        for name in next {
            if name != start && seen.insert(name.clone()) {
                stack.push(name.clone());
            }
        }
    }

    seen
}
