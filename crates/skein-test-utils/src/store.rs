//! Store doubles
//!
//! [`MemStore`] is the in-memory stand-in for the filesystem store;
//! [`SlowStore`] and [`BrokenStore`] wrap any store to exercise lock
//! contention and storage-failure paths.

use dashmap::DashMap;
use skein_store::ArtefactStore;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// In-memory artefact store
#[derive(Debug, Default)]
pub struct MemStore {
    files: DashMap<PathBuf, String>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current durable bytes of a path, if any
    #[must_use]
    pub fn snapshot(&self, path: &Path) -> Option<String> {
        self.files.get(path).map(|entry| entry.value().clone())
    }
}

impl ArtefactStore for MemStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|path| path.parent() == Some(dir))
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.files.remove(path);
        Ok(())
    }
}

/// Delays every write; holds the engine inside its commit long enough for
/// a competing request to hit the lock timeout
#[derive(Debug)]
pub struct SlowStore<S> {
    inner: S,
    write_delay: Duration,
}

impl<S> SlowStore<S> {
    #[must_use]
    pub fn new(inner: S, write_delay: Duration) -> Self {
        Self { inner, write_delay }
    }
}

impl<S: ArtefactStore> ArtefactStore for SlowStore<S> {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::thread::sleep(self.write_delay);
        self.inner.write(path, contents)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.inner.list(dir)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.inner.remove(path)
    }
}

/// Fails every write and remove with a storage error
#[derive(Debug)]
pub struct BrokenStore<S> {
    inner: S,
}

impl<S> BrokenStore<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: ArtefactStore> ArtefactStore for BrokenStore<S> {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.inner.read(path)
    }

    fn write(&self, _path: &Path, _contents: &str) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.inner.list(dir)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn remove(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}
