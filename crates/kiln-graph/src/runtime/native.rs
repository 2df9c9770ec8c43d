//! `std::fs` backed runtime.

use std::fs;
use std::path::{Path, PathBuf};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Runtime that talks to the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl Runtime for NativeRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        fs::read(path).map_err(|e| RuntimeError::from_io(path, e))
    }

    /// Writes go to a sibling temp file first and are renamed into place, so
    /// a reader never observes a half-written module.
    fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| RuntimeError::Other(format!("not a file path: {}", path.display())))?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        fs::write(&temp_path, content).map_err(|e| RuntimeError::from_io(&temp_path, e))?;

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(RuntimeError::from_io(path, e));
        }

        Ok(())
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let meta = fs::metadata(path).map_err(|e| RuntimeError::from_io(path, e))?;
        Ok(FileMetadata {
            size: meta.len(),
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> RuntimeResult<PathBuf> {
        fs::canonicalize(path).map_err(|e| RuntimeError::from_io(path, e))
    }

    fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let result = if recursive {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };
        result.map_err(|e| RuntimeError::from_io(path, e))
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|e| RuntimeError::Io(e.to_string()))
    }
}
