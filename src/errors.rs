// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::engine::PackageName;

#[derive(Error, Debug)]
pub enum MonodevError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A plugin or conductor failed for a specific package.
    #[error("[{package}] {message}")]
    Package {
        package: PackageName,
        message: String,
    },

    #[error("Shutdown error: {0}")]
    Shutdown(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonodevError {
    /// Convenience constructor for [`MonodevError::Package`].
    pub fn package(package: impl Into<PackageName>, message: impl Into<String>) -> Self {
        MonodevError::Package {
            package: package.into(),
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MonodevError>;
