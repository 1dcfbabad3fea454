// src/fs/mock.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use super::FileSystem;

/// In-memory tree for discovery tests.
///
/// Paths are stored exactly as given; directories are created implicitly for
/// every ancestor of an added file.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    dirs: Arc<Mutex<BTreeMap<PathBuf, Vec<PathBuf>>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.link_parent(&path);
        if let Ok(mut files) = self.files.lock() {
            files.insert(path, content.into());
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.link_parent(&path);
        if let Ok(mut dirs) = self.dirs.lock() {
            dirs.entry(path).or_default();
        }
    }

    fn link_parent(&self, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        if parent.as_os_str().is_empty() {
            return;
        }
        self.add_dir(parent);
        if let Ok(mut dirs) = self.dirs.lock() {
            let children = dirs.entry(parent.to_path_buf()).or_default();
            if !children.iter().any(|c| c == path) {
                children.push(path.to_path_buf());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().map_err(|_| anyhow!("mock fs poisoned"))?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("file not found: {:?}", path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs
            .lock()
            .map(|dirs| dirs.contains_key(path))
            .unwrap_or(false)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if self.is_file(path) || self.is_dir(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("path not found: {:?}", path))
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let dirs = self.dirs.lock().map_err(|_| anyhow!("mock fs poisoned"))?;
        dirs.get(path)
            .cloned()
            .ok_or_else(|| anyhow!("not a directory: {:?}", path))
    }
}
