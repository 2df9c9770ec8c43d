//! Helpers shared by the subcommands.

use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// The project root: `--cwd` if given (relative to the process directory),
/// else the process directory.
pub(crate) fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => current.join(dir),
        None => current,
    })
}

/// Read a JSON input file below `root`.
pub(crate) fn read_input(root: &Path, file: &Path) -> Result<String> {
    let path = root.join(file);
    std::fs::read_to_string(&path).with_path(&path)
}
