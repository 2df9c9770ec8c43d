//! Filesystem abstraction for the server build.
//!
//! Every read, write and symlink resolution the build performs goes through
//! the [`Runtime`] trait. The native implementation wraps `std::fs`; the
//! in-memory [`test_utils::TestRuntime`] lets graph resolution run against a
//! virtual tree (symlinks included) in tests.

#[cfg(not(target_family = "wasm"))]
pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Symlink chain did not terminate
    #[error("Too many levels of symbolic links: {}", .0.display())]
    SymlinkLoop(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

impl RuntimeError {
    /// Map a `std::io::Error` for `path`, keeping "not found" distinguishable.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            RuntimeError::FileNotFound(path.to_path_buf())
        } else {
            RuntimeError::Io(format!("{}: {}", path.display(), err))
        }
    }

    /// Whether the error only says the path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuntimeError::FileNotFound(_))
    }
}

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
}

/// Platform runtime trait
///
/// Methods are synchronous. Callers that fan out (node module writes) do so
/// from rayon worker threads, hence `Send + Sync`.
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read a UTF-8 file from the filesystem
    fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes)
            .map_err(|e| RuntimeError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Write a file to the filesystem
    fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Get file metadata (follows symlinks)
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Resolve every symlink in `path` and return its absolute physical location
    fn canonicalize(&self, path: &Path) -> RuntimeResult<PathBuf>;

    /// Create a directory
    fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// Get the current working directory
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;
}
