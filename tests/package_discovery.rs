// tests/package_discovery.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::path::{Path, PathBuf};

use monodev::errors::MonodevError;
use monodev::fs::mock::MockFileSystem;
use monodev::package::{discover_packages, read_manifest, resolve_package_roots};

fn manifest(name: &str) -> String {
    format!("name = \"{name}\"\n")
}

fn sample_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("ws/packages/zeta/package.toml", manifest("zeta"));
    fs.add_file("ws/packages/alpha/package.toml", manifest("alpha"));
    fs.add_file("ws/apps/web/package.toml", manifest("web"));
    fs.add_file("ws/packages/node_modules/package.toml", manifest("vendored"));
    fs.add_file("ws/packages/.cache/package.toml", manifest("cache"));
    fs.add_file("ws/packages/alpha/fixtures/inner/package.toml", manifest("inner"));
    fs.add_dir("ws/packages/empty");
    fs
}

fn sources(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_matches_are_sorted_within_a_source() {
    let fs = sample_fs();
    let roots = resolve_package_roots(&fs, Path::new("ws"), &sources(&["packages/*"])).unwrap();

    assert_eq!(
        roots,
        vec![
            PathBuf::from("ws/packages/alpha"),
            PathBuf::from("ws/packages/zeta"),
        ]
    );
}

#[test]
fn test_sources_are_concatenated_in_order() {
    let fs = sample_fs();
    let roots = resolve_package_roots(
        &fs,
        Path::new("ws"),
        &sources(&["./packages/*", "apps/*", "packages/zeta"]),
    )
    .unwrap();

    assert_eq!(
        roots,
        vec![
            PathBuf::from("ws/packages/alpha"),
            PathBuf::from("ws/packages/zeta"),
            PathBuf::from("ws/apps/web"),
        ]
    );
}

#[test]
fn test_globstar_reaches_nested_packages() {
    let fs = sample_fs();
    let roots = resolve_package_roots(&fs, Path::new("ws"), &sources(&["packages/**"])).unwrap();

    assert!(roots.contains(&PathBuf::from("ws/packages/alpha/fixtures/inner")));
    assert!(!roots.iter().any(|r| r.ends_with("node_modules")));
    assert!(!roots.iter().any(|r| r.ends_with(".cache")));
    assert!(!roots.iter().any(|r| r.ends_with("empty")));
}

#[test]
fn test_discover_packages_reads_manifests_and_config() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "ws/packages/api/package.toml",
        r#"
name = "api"
version = "2.1.0"

[dependencies]
shared = "*"
express = "^4"

[dev-dependencies]
testing = { path = "../testing" }

[scripts]
build = "tsc -p ."
"#,
    );
    fs.add_file("ws/packages/shared/package.toml", manifest("shared"));

    let config = ConfigFileBuilder::from_toml(
        "ws",
        r#"
[package.api]
output_dir = "dist"
"#,
    )
    .build();

    let packages = discover_packages(&fs, &config).unwrap();
    assert_eq!(packages.len(), 2);

    let api = &packages[0];
    assert_eq!(api.name, "api");
    assert_eq!(api.version, "2.1.0");
    assert_eq!(api.root, PathBuf::from("ws/packages/api"));
    assert!(api.dependencies.contains("shared"));
    assert!(api.dependencies.contains("express"));
    assert!(api.dev_dependencies.contains("testing"));
    assert_eq!(api.scripts.get("build").map(String::as_str), Some("tsc -p ."));
    assert_eq!(api.config.output_dir, "dist");

    let shared = &packages[1];
    assert_eq!(shared.version, "0.0.0");
    assert_eq!(shared.config.output_dir, "build");
}

#[test]
fn test_no_packages_is_config_error() {
    let fs = MockFileSystem::new();
    fs.add_dir("ws/packages");
    let config = ConfigFileBuilder::new("ws").build();

    match discover_packages(&fs, &config) {
        Err(MonodevError::ConfigError(msg)) => assert!(msg.contains("no packages")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_invalid_manifest_is_config_error() {
    let fs = MockFileSystem::new();
    fs.add_file("ws/packages/broken/package.toml", "name = [");
    let config = ConfigFileBuilder::new("ws").build();

    match discover_packages(&fs, &config) {
        Err(MonodevError::ConfigError(msg)) => assert!(msg.contains("invalid manifest")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_manifest_requires_a_name() {
    let fs = MockFileSystem::new();
    fs.add_file("ws/nameless/package.toml", "name = \"  \"\n");

    let result = read_manifest(&fs, Path::new("ws/nameless"));
    assert!(matches!(result, Err(MonodevError::ConfigError(_))));
}

#[test]
fn test_missing_manifest_is_config_error() {
    let fs = MockFileSystem::new();
    fs.add_dir("ws/nothing");

    let result = read_manifest(&fs, Path::new("ws/nothing"));
    assert!(matches!(result, Err(MonodevError::ConfigError(_))));
}
