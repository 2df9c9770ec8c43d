//! Contained writes for generated server modules.
//!
//! Every generated file is addressed by a path relative to the server output
//! directory. Paths are cleaned with `path_clean` and rejected if they would
//! land outside that directory, so a hostile node index or matcher name can
//! never write elsewhere.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use kiln_graph::Runtime;
use path_clean::PathClean;
use tracing::trace;

use crate::{Error, Result};

/// Writes files below a fixed output root through a [`Runtime`].
#[derive(Debug, Clone)]
pub struct OutputWriter {
    runtime: Arc<dyn Runtime>,
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(runtime: Arc<dyn Runtime>, root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            root: root.into().clean(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// Returns the absolute path written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let target = validate_output_path(&self.root, relative)?;

        if let Some(parent) = target.parent() {
            self.runtime
                .create_dir(parent, true)
                .map_err(|source| Error::WriteFailure {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        self.runtime
            .write_file(&target, contents.as_bytes())
            .map_err(|source| Error::WriteFailure {
                path: target.clone(),
                source,
            })?;

        trace!(path = %target.display(), bytes = contents.len(), "wrote output file");
        Ok(target)
    }
}

/// Resolve `relative` against `base_dir`, refusing anything that escapes it.
///
/// Rejects:
/// - NUL bytes
/// - absolute paths
/// - paths that climb out of `base_dir` (`../x`, `a/../../x`)
pub fn validate_output_path(base_dir: &Path, relative: &str) -> Result<PathBuf> {
    if relative.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let relative_path = Path::new(relative);
    if relative_path.is_absolute()
        || relative_path
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(Error::InvalidOutputPath(format!(
            "'{relative}' must be relative to the output directory"
        )));
    }

    let base = base_dir.clean();
    let target = base.join(relative_path).clean();

    if target == base || !target.starts_with(&base) {
        return Err(Error::InvalidOutputPath(format!(
            "'{relative}' resolves outside of '{}'",
            base.display()
        )));
    }

    Ok(target)
}
