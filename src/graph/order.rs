// src/graph/order.rs

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::engine::PackageName;
use crate::errors::{MonodevError, Result};
use crate::package::Package;

/// Order packages so that every dependency precedes its dependants.
///
/// `packages` must be in discovery order; it breaks ties between unrelated
/// packages. Packages without any dependency come first.
///
/// Edge direction: dependency -> dependant. For `app` depending on `lib` we
/// add `lib -> app`.
pub fn order_by_dependencies(packages: &[Package]) -> Result<Vec<PackageName>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for pkg in packages.iter() {
        graph.add_node(pkg.name.as_str());
    }
    for pkg in packages.iter() {
        for dep in pkg.direct_dependencies() {
            graph.add_edge(dep.as_str(), pkg.name.as_str(), ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        return Err(MonodevError::DependencyCycle(format!(
            "dependency cycle detected involving package '{}'",
            cycle.node_id()
        )));
    }

    // Kahn's algorithm; among ready packages the smallest
    // (has_dependencies, discovery index) goes first.
    let index: HashMap<&str, usize> = packages
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name.as_str(), i))
        .collect();
    let key = |name: &str| -> Reverse<(bool, usize)> {
        let i = index.get(name).copied().unwrap_or(usize::MAX);
        let has_deps = packages.get(i).map(|p| p.has_dependencies()).unwrap_or(true);
        Reverse((has_deps, i))
    };

    let mut in_degree: HashMap<&str, usize> = graph
        .nodes()
        .map(|n| (n, graph.neighbors_directed(n, Direction::Incoming).count()))
        .collect();

    let mut ready: BinaryHeap<Reverse<(bool, usize)>> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| key(*name))
        .collect();

    let mut order = Vec::with_capacity(packages.len());
    while let Some(Reverse((_, i))) = ready.pop() {
        let Some(pkg) = packages.get(i) else {
            continue;
        };
        order.push(pkg.name.clone());

        for next in graph.neighbors_directed(pkg.name.as_str(), Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(key(next));
                }
            }
        }
    }

    Ok(order)
}
