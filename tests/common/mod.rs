#![allow(dead_code)]

pub use monodev_test_utils::builders;
pub use monodev_test_utils::{init_tracing, with_timeout};

use std::fs;
use std::path::{Path, PathBuf};

/// Write `Monodev.toml` plus one `package.toml` per `(dir, manifest)` pair
/// under `root`. Returns the config path.
pub fn write_workspace(root: &Path, config: &str, packages: &[(&str, &str)]) -> PathBuf {
    let config_path = root.join("Monodev.toml");
    fs::write(&config_path, config).unwrap();

    for (dir, manifest) in packages {
        let pkg_dir = root.join(dir);
        fs::create_dir_all(pkg_dir.join("src")).unwrap();
        fs::write(pkg_dir.join("package.toml"), manifest).unwrap();
    }

    config_path
}

/// Minimal manifest for `name` depending on `deps`.
pub fn manifest(name: &str, deps: &[&str]) -> String {
    let mut out = format!("name = \"{name}\"\nversion = \"1.0.0\"\n\n[dependencies]\n");
    for dep in deps {
        out.push_str(&format!("{dep} = \"*\"\n"));
    }
    out
}
