//! Artefact storage
//!
//! The [`ArtefactStore`] trait is the engine's only I/O boundary. Paths
//! are relative to the store root; artefacts are plain text files under
//! kind-specific subdirectories. `write` must be a single atomic replace:
//! a reader sees either the prior full document or the new full document,
//! never a partial write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Durable storage collaborator
pub trait ArtefactStore: Send + Sync {
    /// Read a whole document
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Atomically replace a document, creating parent directories as
    /// needed
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Files directly under a directory; a missing directory lists as
    /// empty
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;

    /// Delete a document; removing a missing file is a no-op success
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Filesystem store rooted at one directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl ArtefactStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.abs(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let abs = self.abs(path);
        let parent = abs.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        // Write-then-rename into the target directory keeps the replace
        // atomic on the same filesystem.
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&abs).map_err(|err| err.error)?;
        Ok(())
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(self.abs(dir)) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(dir.join(entry.file_name()));
            }
        }
        Ok(paths)
    }

    fn exists(&self, path: &Path) -> bool {
        self.abs(path).is_file()
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(self.abs(path)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
