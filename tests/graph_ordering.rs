// tests/graph_ordering.rs

mod common;
use crate::common::builders::{GraphBuilder, RawPackageBuilder};

use monodev::errors::MonodevError;
use monodev::graph::build_graph;
use monodev::types::Relation;

fn names(graph: &monodev::graph::PackageGraph) -> Vec<&str> {
    graph.names().iter().map(|s| s.as_str()).collect()
}

#[test]
fn test_dependency_first_order() {
    // Discovered in reverse order on purpose.
    let graph = GraphBuilder::new()
        .package("c", &["b"])
        .package("b", &["a"])
        .package("a", &[])
        .build();

    assert_eq!(names(&graph), vec!["a", "b", "c"]);
}

#[test]
fn test_packages_without_dependencies_come_first_in_discovery_order() {
    let graph = GraphBuilder::new()
        .package("x", &["y"])
        .package("y", &[])
        .package("z", &[])
        .package("w", &["z"])
        .build();

    assert_eq!(names(&graph), vec!["y", "z", "x", "w"]);
}

#[test]
fn test_ordering_is_deterministic() {
    let build = || {
        GraphBuilder::new()
            .package("api", &["core", "db"])
            .package("core", &[])
            .package("db", &["core"])
            .package("web", &["api"])
            .package("docs", &[])
            .build()
    };

    let first = build();
    for _ in 0..10 {
        assert_eq!(names(&build()), names(&first));
    }
    assert_eq!(names(&first), vec!["core", "docs", "db", "api", "web"]);
}

#[test]
fn test_external_dependencies_are_dropped() {
    let graph = GraphBuilder::new()
        .package("lib", &["serde", "left-pad"])
        .package("app", &["lib", "react"])
        .build();

    let lib = graph.get("lib").unwrap();
    assert!(lib.dependencies.is_empty());
    assert!(!lib.has_dependencies());

    let app = graph.get("app").unwrap();
    assert_eq!(app.dependencies.iter().collect::<Vec<_>>(), vec!["lib"]);
}

#[test]
fn test_dependants_are_the_inverse_of_all_dependency_kinds() {
    let graph = GraphBuilder::new()
        .package("lib", &[])
        .raw(RawPackageBuilder::new("tool").build())
        .raw(RawPackageBuilder::new("app").dep("lib").dev_dep("tool").build())
        .build();

    assert!(graph.dependants_of("lib").contains("app"));
    assert!(graph.dependants_of("tool").contains("app"));
    assert!(graph.dependants_of("app").is_empty());
    assert!(graph.dependants_of("unknown").is_empty());
    assert_eq!(names(&graph), vec!["lib", "tool", "app"]);
}

#[test]
fn test_soft_dependencies_order_packages() {
    let graph = GraphBuilder::new()
        .raw(RawPackageBuilder::new("server").soft_dep("db").build())
        .package("db", &[])
        .build();

    assert_eq!(names(&graph), vec!["db", "server"]);
    assert!(graph.dependants_of("db").contains("server"));
    assert!(graph.get("server").unwrap().soft_dependencies.contains("db"));
}

#[test]
fn test_unknown_soft_dependency_is_ignored() {
    let graph = GraphBuilder::new()
        .raw(RawPackageBuilder::new("server").soft_dep("nowhere").build())
        .build();

    assert!(graph.get("server").unwrap().soft_dependencies.is_empty());
}

#[test]
fn test_cycle_is_a_dependency_cycle_error() {
    let result = GraphBuilder::new()
        .package("a", &["c"])
        .package("b", &["a"])
        .package("c", &["b"])
        .try_build();

    match result {
        Err(MonodevError::DependencyCycle(msg)) => {
            assert!(msg.contains("cycle"));
        }
        other => panic!("Expected DependencyCycle, got: {:?}", other.map(|g| g.len())),
    }
}

#[test]
fn test_dev_dependency_cycle_is_rejected_too() {
    let result = GraphBuilder::new()
        .raw(RawPackageBuilder::new("a").dev_dep("b").build())
        .raw(RawPackageBuilder::new("b").dep("a").build())
        .try_build();

    assert!(matches!(result, Err(MonodevError::DependencyCycle(_))));
}

#[test]
fn test_duplicate_package_names_are_rejected() {
    let result = GraphBuilder::new()
        .raw(RawPackageBuilder::new("dup").root("packages/one").build())
        .raw(RawPackageBuilder::new("dup").root("packages/two").build())
        .try_build();

    assert!(matches!(result, Err(MonodevError::ConfigError(_))));
}

#[test]
fn test_configured_package_must_exist() {
    let raw = GraphBuilder::new().package("lib", &[]).into_raw();
    let result = build_graph(raw, ["lib", "ghost"]);

    match result {
        Err(MonodevError::ConfigError(msg)) => assert!(msg.contains("ghost")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|g| g.len())),
    }
}

#[test]
fn test_transitive_closures() {
    let graph = GraphBuilder::new()
        .package("core", &[])
        .package("db", &["core"])
        .package("api", &["db"])
        .package("web", &["api"])
        .package("docs", &[])
        .build();

    let core = graph.get("core").unwrap();
    assert_eq!(
        core.all_dependants.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        vec!["api", "db", "web"]
    );

    let web = graph.get("web").unwrap();
    assert_eq!(
        web.all_dependencies.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        vec!["api", "core", "db"]
    );

    assert_eq!(graph.transitive_closure("api", Relation::Dependants).len(), 1);
    assert!(graph.transitive_closure("docs", Relation::Dependencies).is_empty());
}

#[test]
fn test_filter_keeps_dependencies_in_build_order() {
    let graph = GraphBuilder::new()
        .package("core", &[])
        .package("db", &["core"])
        .package("api", &["db"])
        .package("web", &["api"])
        .package("docs", &[])
        .build();

    let filtered = graph.filter(&["api".to_string()], false).unwrap();
    assert_eq!(names(&filtered), vec!["core", "db", "api"]);

    // Edges to packages outside the selection are gone.
    assert!(filtered.get("api").unwrap().dependants.is_empty());
    assert!(filtered.get("core").unwrap().all_dependants.contains("api"));
    assert!(!filtered.get("core").unwrap().all_dependants.contains("web"));
}

#[test]
fn test_filter_exact_keeps_only_named_packages() {
    let graph = GraphBuilder::new()
        .package("core", &[])
        .package("db", &["core"])
        .package("api", &["db"])
        .build();

    let filtered = graph
        .filter(&["api".to_string(), "core".to_string()], true)
        .unwrap();
    assert_eq!(names(&filtered), vec!["core", "api"]);
    assert!(filtered.get("api").unwrap().dependencies.is_empty());
}

#[test]
fn test_filter_unknown_package() {
    let graph = GraphBuilder::new().package("core", &[]).build();

    match graph.filter(&["nope".to_string()], false) {
        Err(MonodevError::PackageNotFound(name)) => assert_eq!(name, "nope"),
        other => panic!("Expected PackageNotFound, got: {:?}", other.map(|g| g.len())),
    }
}

#[test]
fn test_filter_without_names_keeps_everything() {
    let graph = GraphBuilder::new()
        .package("core", &[])
        .package("db", &["core"])
        .build();

    let filtered = graph.filter(&[], false).unwrap();
    assert_eq!(names(&filtered), names(&graph));
}
