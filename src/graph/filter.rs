// src/graph/filter.rs

use std::collections::{BTreeSet, HashMap};

use crate::engine::PackageName;
use crate::errors::{MonodevError, Result};
use crate::graph::PackageGraph;
use crate::graph::build::fill_closures;
use crate::package::Package;

impl PackageGraph {
    /// Sub-graph for the packages named on the command line.
    ///
    /// Without `exact`, every (transitive) dependency of a named package is
    /// kept as well. Edges to packages outside the selection are removed and
    /// closures recomputed; the build order is the original one restricted to
    /// the selection. An empty `names` keeps everything.
    pub fn filter(&self, names: &[String], exact: bool) -> Result<PackageGraph> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        let mut selected: BTreeSet<PackageName> = BTreeSet::new();
        for name in names {
            let pkg = self
                .get(name)
                .ok_or_else(|| MonodevError::PackageNotFound(name.clone()))?;
            selected.insert(pkg.name.clone());
            if !exact {
                selected.extend(pkg.all_dependencies.iter().cloned());
            }
        }

        let mut packages: HashMap<PackageName, Package> = selected
            .iter()
            .filter_map(|name| self.get(name))
            .map(|pkg| (pkg.name.clone(), restrict(pkg, &selected)))
            .collect();
        fill_closures(&mut packages);

        let order = self
            .names()
            .iter()
            .filter(|name| selected.contains(*name))
            .cloned()
            .collect();

        Ok(PackageGraph::from_parts(packages, order))
    }
}

fn restrict(pkg: &Package, selected: &BTreeSet<PackageName>) -> Package {
    let keep = |set: &BTreeSet<PackageName>| -> BTreeSet<PackageName> {
        set.intersection(selected).cloned().collect()
    };

    let mut pkg = pkg.clone();
    pkg.dependencies = keep(&pkg.dependencies);
    pkg.dev_dependencies = keep(&pkg.dev_dependencies);
    pkg.soft_dependencies = keep(&pkg.soft_dependencies);
    pkg.dependants = keep(&pkg.dependants);
    pkg
}
