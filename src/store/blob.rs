//! # Blob Persistence
//!
//! Key-value storage of whole documents. The local backend reads and writes
//! one document wholesale on every operation; there are no partial writes.
//!
//! `FileBlobStore` keeps each key in `<dir>/<key>.json` and writes through
//! a `.tmp` file plus `rename()` so a crash never leaves half a document.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use super::backend::StoreError;

pub trait BlobStore: Send + Sync {
    /// Returns `None` if nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the whole blob stored under `key`.
    fn write(&self, key: &str, contents: &str) -> Result<(), StoreError>;
}

fn io_err(context: &str, path: &Path, e: io::Error) -> StoreError {
    StoreError::Storage(format!("{context} {}: {e}", path.display()))
}

/// Directory-backed blob store.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Uses `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_err("failed to create", &dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err("failed to read", &path, e)),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents).map_err(|e| io_err("failed to write", &tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| io_err("failed to replace", &path, e))?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

/// Process-local blob store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".to_string()))?;
        blobs.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}
