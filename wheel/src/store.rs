//! Filesystem access for the merge engine
//!
//! All paths given to a [`FileStore`] are relative to the project root.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Storage the merge engine reads and writes through
pub trait FileStore {
    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read a UTF-8 file, `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than "not found".
    fn read(&self, path: &Path) -> io::Result<Option<String>>;

    /// Create a new file, failing with [`io::ErrorKind::AlreadyExists`] if
    /// anything is already there
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Replace a file's contents atomically
    ///
    /// Readers observe either the old or the new contents, never a mix.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the original file is left untouched.
    fn replace(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// [`FileStore`] backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn ensure_parent(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(self.resolve(path)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        let full = self.resolve(path);
        Self::ensure_parent(&full)?;

        let mut file = OpenOptions::new().write(true).create_new(true).open(&full)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn replace(&self, path: &Path, contents: &str) -> io::Result<()> {
        let full = self.resolve(path);
        Self::ensure_parent(&full)?;
        let dir = full.parent().unwrap_or_else(|| Path::new("."));

        // Same directory as the target so the final rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(contents.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&full).map_err(|e| e.error)?;
        Ok(())
    }
}
