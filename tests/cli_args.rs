// tests/cli_args.rs

use clap::Parser;
use monodev::cli::{CliArgs, Command};

#[test]
fn test_develop_with_packages_and_once() {
    let args = CliArgs::try_parse_from(["monodev", "develop", "-p", "api", "web", "--once"]).unwrap();

    assert_eq!(args.config, "Monodev.toml");
    match args.command {
        Command::Develop(develop) => {
            assert_eq!(develop.filter.packages, vec!["api", "web"]);
            assert!(!develop.filter.exact);
            assert!(develop.once);
        }
        other => panic!("Expected develop, got: {:?}", other),
    }
}

#[test]
fn test_global_config_flag_after_subcommand() {
    let args =
        CliArgs::try_parse_from(["monodev", "build", "--exact", "-p", "lib", "--config", "repo/Monodev.toml"])
            .unwrap();

    assert_eq!(args.config, "repo/Monodev.toml");
    match args.command {
        Command::Build(filter) => {
            assert_eq!(filter.packages, vec!["lib"]);
            assert!(filter.exact);
        }
        other => panic!("Expected build, got: {:?}", other),
    }
}

#[test]
fn test_graph_takes_no_filter() {
    assert!(CliArgs::try_parse_from(["monodev", "graph"]).is_ok());
    assert!(CliArgs::try_parse_from(["monodev", "graph", "-p", "lib"]).is_err());
}

#[test]
fn test_subcommand_is_required() {
    assert!(CliArgs::try_parse_from(["monodev"]).is_err());
}
