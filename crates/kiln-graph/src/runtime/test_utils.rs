//! In-memory runtime for tests.
//!
//! `TestRuntime` models files, directories and symlinks without touching the
//! disk. Symlinks are resolved component by component the way `realpath`
//! does, so directory links (`node_modules/pkg -> ../packages/pkg`) alias
//! every file below them.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

const MAX_SYMLINK_HOPS: usize = 40;

/// In-memory filesystem with symlink support.
#[derive(Debug)]
pub struct TestRuntime {
    cwd: PathBuf,
    inner: RwLock<TestFs>,
}

#[derive(Debug, Default)]
struct TestFs {
    files: FxHashMap<PathBuf, Vec<u8>>,
    symlinks: FxHashMap<PathBuf, PathBuf>,
    dirs: FxHashSet<PathBuf>,
}

impl TestRuntime {
    /// Create an empty filesystem rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into().clean();
        let mut fs = TestFs::default();
        fs.add_dir_all(&cwd);
        Self {
            cwd,
            inner: RwLock::new(fs),
        }
    }

    /// Builder form of [`TestRuntime::add_file`].
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, content);
        self
    }

    /// Builder form of [`TestRuntime::add_symlink`].
    pub fn with_symlink(self, link: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        self.add_symlink(link, target);
        self
    }

    /// Add a file, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.absolute(path.as_ref());
        let mut fs = self.inner.write();
        if let Some(parent) = path.parent() {
            fs.add_dir_all(parent);
        }
        fs.files.insert(path, content.into());
    }

    /// Add a symlink. Relative targets are taken relative to the link's directory.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = self.absolute(link.as_ref());
        let target = target.as_ref();
        let target = if target.is_absolute() {
            target.clean()
        } else {
            link.parent()
                .unwrap_or_else(|| Path::new("/"))
                .join(target)
                .clean()
        };
        let mut fs = self.inner.write();
        if let Some(parent) = link.parent() {
            fs.add_dir_all(parent);
        }
        fs.symlinks.insert(link, target);
    }

    /// Contents of a file as text, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.absolute(path.as_ref());
        let fs = self.inner.read();
        let real = fs.resolve(&path).ok()?;
        fs.files
            .get(&real)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All file paths, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.inner.read().files.keys().cloned().collect();
        files.sort();
        files
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

impl TestFs {
    fn add_dir_all(&mut self, dir: &Path) {
        let mut current = Some(dir);
        while let Some(dir) = current {
            if !self.dirs.insert(dir.to_path_buf()) {
                break;
            }
            current = dir.parent();
        }
    }

    fn dir_exists(&self, dir: &Path) -> bool {
        dir.parent().is_none() || self.dirs.contains(dir)
    }

    fn resolve(&self, path: &Path) -> RuntimeResult<PathBuf> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_SYMLINK_HOPS {
            match self.outermost_link(&current) {
                Some((link, target)) => {
                    let rest = current
                        .strip_prefix(&link)
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    current = target.join(rest).clean();
                }
                None => return Ok(current),
            }
        }
        Err(RuntimeError::SymlinkLoop(path.to_path_buf()))
    }

    fn outermost_link(&self, path: &Path) -> Option<(PathBuf, PathBuf)> {
        let ancestors: Vec<&Path> = path.ancestors().collect();
        ancestors.into_iter().rev().find_map(|ancestor| {
            self.symlinks
                .get(ancestor)
                .map(|target| (ancestor.to_path_buf(), target.clone()))
        })
    }
}

impl Runtime for TestRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let abs = self.absolute(path);
        let fs = self.inner.read();
        let real = fs.resolve(&abs)?;
        fs.files
            .get(&real)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let abs = self.absolute(path);
        let mut fs = self.inner.write();
        let real = fs.resolve(&abs)?;
        if fs.dirs.contains(&real) {
            return Err(RuntimeError::Io(format!("{} is a directory", path.display())));
        }
        match real.parent() {
            Some(parent) if !fs.dir_exists(parent) => {
                return Err(RuntimeError::FileNotFound(parent.to_path_buf()));
            }
            _ => {}
        }
        fs.files.insert(real, content.to_vec());
        Ok(())
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let abs = self.absolute(path);
        let fs = self.inner.read();
        let real = fs.resolve(&abs)?;
        if let Some(bytes) = fs.files.get(&real) {
            return Ok(FileMetadata {
                size: bytes.len() as u64,
                is_dir: false,
                is_file: true,
            });
        }
        if fs.dirs.contains(&real) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
            });
        }
        Err(RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.canonicalize(path).is_ok()
    }

    fn canonicalize(&self, path: &Path) -> RuntimeResult<PathBuf> {
        let abs = self.absolute(path);
        let fs = self.inner.read();
        let real = fs.resolve(&abs)?;
        if fs.files.contains_key(&real) || fs.dirs.contains(&real) {
            Ok(real)
        } else {
            Err(RuntimeError::FileNotFound(path.to_path_buf()))
        }
    }

    fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let abs = self.absolute(path);
        let mut fs = self.inner.write();
        let real = fs.resolve(&abs)?;
        if recursive {
            fs.add_dir_all(&real);
            return Ok(());
        }
        match real.parent() {
            Some(parent) if !fs.dir_exists(parent) => {
                Err(RuntimeError::FileNotFound(parent.to_path_buf()))
            }
            _ => {
                fs.dirs.insert(real);
                Ok(())
            }
        }
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
