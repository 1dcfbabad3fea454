// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Whether `path` lies inside `dir` (or is `dir` itself).
///
/// - First we try a direct `starts_with`.
/// - If that fails (e.g. because notify reports canonical paths while the
///   package root is relative or goes through a symlink), we canonicalize
///   both and try again. A path that no longer exists falls back to
///   canonicalizing its parent.
pub fn is_within(dir: &Path, path: &Path) -> bool {
    if path.starts_with(dir) {
        return true;
    }

    let Ok(dir_canon) = dir.canonicalize() else {
        return false;
    };

    if let Ok(path_canon) = path.canonicalize() {
        return path_canon.starts_with(&dir_canon);
    }

    // Removed files cannot be canonicalized; use the parent instead.
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name).starts_with(&dir_canon))
            .unwrap_or(false),
        _ => false,
    }
}
