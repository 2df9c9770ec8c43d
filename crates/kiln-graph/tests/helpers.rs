//! Shared fixtures for kiln-graph integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A temporary project directory.
pub fn project() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Write `contents` to `root/relative`, creating parents.
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

/// Create a symlink at `root/link` pointing to `target` (relative to the link's directory).
#[cfg(unix)]
pub fn symlink(root: &Path, link: &str, target: &str) {
    let link = root.join(link);
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::os::unix::fs::symlink(target, link).expect("create symlink");
}
