// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `monodev`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "monodev",
    version,
    about = "Build, clean, develop and deploy the packages of a monorepo in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workspace config file (TOML).
    ///
    /// Package sources are resolved relative to the directory containing it.
    #[arg(long, global = true, value_name = "PATH", default_value = "Monodev.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MONODEV_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the coordinated development service.
    Develop(DevelopArgs),
    /// Run the configured build plugin for each package, in build order.
    Build(PackageFilterArgs),
    /// Clean the build output of each package.
    Clean(PackageFilterArgs),
    /// Run the configured deploy plugin for each package that has one.
    Deploy(PackageFilterArgs),
    /// Print the resolved build order; executes nothing.
    Graph,
}

/// Package selection shared by most subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct PackageFilterArgs {
    /// Only act on these packages (plus everything they depend on).
    #[arg(short = 'p', long = "packages", value_name = "NAME", num_args = 1..)]
    pub packages: Vec<String>,

    /// Only act on the packages named with `-p`, not their dependencies.
    #[arg(short = 'e', long)]
    pub exact: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DevelopArgs {
    #[command(flatten)]
    pub filter: PackageFilterArgs,

    /// Exit (gracefully) as soon as the initial run of every package is done.
    #[arg(long)]
    pub once: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
