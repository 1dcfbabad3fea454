// tests/commands.rs

mod common;
use crate::common::builders::GraphBuilder;
use crate::common::{init_tracing, manifest, with_timeout, write_workspace};

use std::path::Path;

use monodev::cli::{DevelopArgs, PackageFilterArgs};
use monodev::commands::{self, Workspace, write_graph};
use monodev::engine::{RunReason, ShutdownStatus};
use monodev::errors::MonodevError;
use monodev::fs::RealFileSystem;
use monodev::plugin::PluginRegistry;
use monodev_test_utils::fake_plugin::{PluginLog, recording_registry};

const PACKAGES: &[(&str, &[&str])] = &[
    ("packages/lib", &[]),
    ("packages/app", &["lib"]),
    ("packages/docs", &[]),
];

fn workspace(root: &Path, config: &str, log: &PluginLog) -> Workspace {
    let manifests: Vec<(String, String)> = PACKAGES
        .iter()
        .map(|(dir, deps)| {
            let name = dir.rsplit('/').next().unwrap();
            (dir.to_string(), manifest(name, deps))
        })
        .collect();
    let manifests: Vec<(&str, &str)> = manifests
        .iter()
        .map(|(d, m)| (d.as_str(), m.as_str()))
        .collect();

    let config_path = write_workspace(root, config, &manifests);
    Workspace::load_with(&config_path, &RealFileSystem, recording_registry(log.clone())).unwrap()
}

fn all() -> PackageFilterArgs {
    PackageFilterArgs::default()
}

#[tokio::test]
async fn test_build_runs_in_build_order_between_hooks() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[hooks.build]
pre = "touch pre-build.marker"
post = "touch post-build.marker"

[package.app]
build_plugin = "recording"

[package.lib]
build_plugin = "recording"
"#,
        &log,
    );

    commands::build(&ws, &all()).await.unwrap();

    assert_eq!(
        log.summary(),
        vec![("lib".to_string(), "build"), ("app".to_string(), "build")]
    );
    assert!(dir.path().join("pre-build.marker").exists());
    assert!(dir.path().join("post-build.marker").exists());
}

#[tokio::test]
async fn test_build_with_exact_filter() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[package.app]
build_plugin = "recording"

[package.lib]
build_plugin = "recording"
"#,
        &log,
    );

    let filter = PackageFilterArgs {
        packages: vec!["app".to_string()],
        exact: true,
    };
    commands::build(&ws, &filter).await.unwrap();
    assert_eq!(log.summary(), vec![("app".to_string(), "build")]);
}

#[tokio::test]
async fn test_build_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[hooks.build]
post = "touch post-build.marker"

[package.app]
build_plugin = "recording"

[package.lib]
build_plugin = { name = "recording", options = { fail = true } }
"#,
        &log,
    );

    let result = commands::build(&ws, &all()).await;

    match result {
        Err(MonodevError::Package { package, .. }) => assert_eq!(package, "lib"),
        Err(e) => panic!("Expected package error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    assert_eq!(log.summary(), vec![("lib".to_string(), "build")]);
    assert!(!dir.path().join("post-build.marker").exists());
}

#[tokio::test]
async fn test_failing_pre_hook_aborts_command() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[hooks.build]
pre = "exit 3"

[package.lib]
build_plugin = "recording"
"#,
        &log,
    );

    assert!(commands::build(&ws, &all()).await.is_err());
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_clean_removes_build_output_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[package.lib]
build_plugin = "recording"

[package.app]
clean_plugin = "recording"
"#,
        &log,
    );

    let output = dir.path().join("packages/lib/build");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("index.js"), "module.exports = {}").unwrap();

    commands::clean(&ws, &all()).await.unwrap();

    assert!(!output.exists());
    assert!(dir.path().join("packages/lib/src").exists());
    assert_eq!(log.summary(), vec![("app".to_string(), "clean")]);
}

#[tokio::test]
async fn test_deploy_requires_a_deploy_plugin() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(dir.path(), "", &log);

    match commands::deploy(&ws, &all()).await {
        Err(MonodevError::ConfigError(msg)) => assert!(msg.contains("deploy plugin")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[tokio::test]
async fn test_deploy_only_runs_packages_with_deploy_plugin() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[package.app]
deploy_plugin = "recording"
"#,
        &log,
    );

    commands::deploy(&ws, &all()).await.unwrap();
    assert_eq!(log.summary(), vec![("app".to_string(), "deploy")]);
}

#[tokio::test]
async fn test_develop_once_processes_everything_and_shuts_down() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[config]
shutdown_grace_period = "2s"

[hooks.develop]
pre = "touch pre-develop.marker"
post = "touch post-develop.marker"

[package.lib]
develop_plugin = "recording"

[package.app]
build_plugin = "recording"
"#,
        &log,
    );

    let args = DevelopArgs {
        filter: all(),
        once: true,
    };
    let status = with_timeout(commands::develop(&ws, &args)).await.unwrap();

    assert_eq!(status, ShutdownStatus::Completed);
    assert_eq!(
        log.summary(),
        vec![("lib".to_string(), "develop"), ("app".to_string(), "build")]
    );
    assert_eq!(log.calls()[0].reason, Some(RunReason::FirstRun));
    // The running lib instance is stopped on shutdown.
    assert_eq!(log.kills(), 1);
    assert!(dir.path().join("pre-develop.marker").exists());
    assert!(dir.path().join("post-develop.marker").exists());
}

#[tokio::test]
async fn test_script_plugin_runs_manifest_script() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_workspace(
        dir.path(),
        r#"
[package.tool]
build_plugin = { name = "script", options = { script = "build" } }
"#,
        &[(
            "packages/tool",
            "name = \"tool\"\n\n[scripts]\nbuild = \"touch built.marker\"\n",
        )],
    );
    let ws = Workspace::load_with(&config_path, &RealFileSystem, PluginRegistry::with_builtins())
        .unwrap();

    commands::build(&ws, &all()).await.unwrap();
    assert!(dir.path().join("packages/tool/built.marker").exists());
}

#[tokio::test]
async fn test_script_plugin_requires_existing_script() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_workspace(
        dir.path(),
        r#"
[package.tool]
build_plugin = { name = "script", options = { script = "compile" } }
"#,
        &[("packages/tool", "name = \"tool\"\n")],
    );
    let ws = Workspace::load_with(&config_path, &RealFileSystem, PluginRegistry::with_builtins())
        .unwrap();

    match commands::build(&ws, &all()).await {
        Err(MonodevError::ConfigError(msg)) => assert!(msg.contains("compile")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[tokio::test]
async fn test_unknown_plugin_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let log = PluginLog::default();
    let ws = workspace(
        dir.path(),
        r#"
[package.lib]
build_plugin = "webpack"
"#,
        &log,
    );

    match commands::build(&ws, &all()).await {
        Err(MonodevError::ConfigError(msg)) => assert!(msg.contains("webpack")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_configured_package_must_be_discovered() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_workspace(
        dir.path(),
        r#"
[package.ghost]
build_plugin = "script"
"#,
        &[("packages/lib", "name = \"lib\"\n")],
    );

    let result = Workspace::load_with(&config_path, &RealFileSystem, PluginRegistry::with_builtins());
    assert!(matches!(result, Err(MonodevError::ConfigError(_))));
}

#[test]
fn test_write_graph_lists_build_order() {
    let graph = GraphBuilder::new()
        .package("app", &["lib", "util"])
        .package("lib", &["util"])
        .package("util", &[])
        .build();

    let mut out = Vec::new();
    write_graph(&graph, &mut out).unwrap();

    let expected = "\
1. util
     dependants: app, lib
2. lib
     depends on: util
     dependants: app
3. app
     depends on: lib, util
";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}
