// src/types.rs

use std::fmt;

use serde::Deserialize;

/// The top-level commands that can carry `pre` / `post` hooks.
///
/// Used as the key of the `[hooks.<command>]` tables in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Clean,
    Build,
    Develop,
    Deploy,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Clean => "clean",
            CommandKind::Build => "build",
            CommandKind::Develop => "develop",
            CommandKind::Deploy => "deploy",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction to follow when expanding a package's relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Packages that depend on the given package.
    Dependants,
    /// Packages the given package depends on.
    Dependencies,
}
