// src/package/discover.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::errors::{MonodevError, Result};
use crate::fs::FileSystem;
use crate::package::RawPackage;
use crate::package::manifest::{MANIFEST_FILE_NAME, read_manifest};

/// Directory names that are never searched for packages.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

/// Find every package root matched by `package_sources`.
///
/// Each source is a glob relative to `workspace_root`; `*` does not cross
/// directory boundaries. Matches of one source are sorted lexically, and the
/// sources are concatenated in the order given. A root matched by more than
/// one source is only reported once.
pub fn resolve_package_roots(
    fs: &dyn FileSystem,
    workspace_root: &Path,
    package_sources: &[String],
) -> Result<Vec<PathBuf>> {
    let candidates = candidate_dirs(fs, workspace_root)?;

    let mut seen = HashSet::new();
    let mut roots = Vec::new();

    for source in package_sources {
        let matcher = compile_source(source)?;
        let mut matched: Vec<&PathBuf> = candidates
            .iter()
            .filter(|dir| {
                dir.strip_prefix(workspace_root)
                    .map(|rel| matcher.is_match(rel))
                    .unwrap_or(false)
            })
            .collect();
        matched.sort();

        debug!(source = %source, count = matched.len(), "resolved package source");

        for dir in matched {
            if seen.insert(dir.clone()) {
                roots.push(dir.clone());
            }
        }
    }

    Ok(roots)
}

/// Discover all packages of the workspace described by `config`.
///
/// Package roots are reported below the canonical workspace root, which is
/// the form notify reports changed paths in.
pub fn discover_packages(fs: &dyn FileSystem, config: &ConfigFile) -> Result<Vec<RawPackage>> {
    let workspace_root = fs.canonicalize(config.root_dir()).map_err(|e| {
        MonodevError::ConfigError(format!(
            "workspace root {:?} is not accessible: {e}",
            config.root_dir()
        ))
    })?;
    let roots = resolve_package_roots(fs, &workspace_root, config.package_sources())?;

    if roots.is_empty() {
        return Err(MonodevError::ConfigError(format!(
            "no packages found for package_sources {:?} in {:?}",
            config.package_sources(),
            config.root_dir()
        )));
    }

    let mut packages = Vec::with_capacity(roots.len());
    for root in roots {
        let manifest = read_manifest(fs, &root)?;
        debug!(package = %manifest.name, root = ?root, "discovered package");

        packages.push(RawPackage {
            config: config.package_config(&manifest.name),
            dependencies: manifest.dependency_names(),
            dev_dependencies: manifest.dev_dependency_names(),
            name: manifest.name,
            version: manifest.version,
            scripts: manifest.scripts,
            root,
        });
    }

    Ok(packages)
}

fn compile_source(source: &str) -> Result<GlobMatcher> {
    let pattern = source.strip_prefix("./").unwrap_or(source);
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            MonodevError::ConfigError(format!("invalid package source glob '{source}': {e}"))
        })?;
    Ok(glob.compile_matcher())
}

/// Every directory below `workspace_root` that holds a manifest.
fn candidate_dirs(fs: &dyn FileSystem, workspace_root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![workspace_root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs.read_dir(&dir)? {
            if !fs.is_dir(&entry) || is_skipped(&entry) {
                continue;
            }
            if fs.is_file(&entry.join(MANIFEST_FILE_NAME)) {
                found.push(entry.clone());
            }
            stack.push(entry);
        }
    }

    Ok(found)
}

fn is_skipped(dir: &Path) -> bool {
    match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.starts_with('.') || SKIPPED_DIRS.contains(&name),
        None => true,
    }
}
