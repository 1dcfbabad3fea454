// src/commands/graph.rs

use std::io::{self, Write};

use crate::graph::PackageGraph;

/// Print the build order with each package's direct relationships.
///
/// ```text
/// 1. lib
/// 2. app
///      depends on: lib
/// ```
pub fn write_graph(graph: &PackageGraph, out: &mut impl Write) -> io::Result<()> {
    for (i, pkg) in graph.ordered().enumerate() {
        writeln!(out, "{}. {}", i + 1, pkg.name)?;

        let deps: Vec<String> = graph.dependencies_of(&pkg.name).into_iter().collect();
        if !deps.is_empty() {
            writeln!(out, "     depends on: {}", deps.join(", "))?;
        }
        if !pkg.dependants.is_empty() {
            let dependants: Vec<&str> = pkg.dependants.iter().map(|s| s.as_str()).collect();
            writeln!(out, "     dependants: {}", dependants.join(", "))?;
        }
    }
    Ok(())
}
