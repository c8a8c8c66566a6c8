//! String key/value substrates
//!
//! The engine only ever needs a synchronous map from string keys to string
//! values. Two implementations are provided:
//!
//! - [`MemorySubstrate`]: process-local, for tests and embedding hosts
//! - [`DirSubstrate`]: one file per key under a data directory
//!
//! `DirSubstrate` uses atomic writes (write to temp file, sync, rename) so a
//! key is never left in a partially-written state.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tempfile::NamedTempFile;

use super::error::{StorageError, StorageResult};

/// A synchronous, string-keyed, string-valued persistent map
pub trait Substrate: Send + Sync {
    /// Read the value under `key`, `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently present
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// In-memory substrate
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemorySubstrate {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Substrate for MemorySubstrate {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.map().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.map().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.map().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self.map().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// File extension used for each key
const VALUE_EXTENSION: &str = "json";

/// Directory-backed substrate
///
/// Storage location: the configured data directory, one `<key>.json` file
/// per key.
#[derive(Debug, Clone)]
pub struct DirSubstrate {
    dir: PathBuf,
}

impl DirSubstrate {
    /// Create a substrate rooted at `dir`; the directory is created lazily
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, VALUE_EXTENSION))
    }
}

impl Substrate for DirSubstrate {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_io(e, key, path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        atomic_write(&path, value.as_bytes()).map_err(|e| StorageError::from_io(e, key, path))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, key, path)),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_io(e, "", self.dir.clone())),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::from_io(e, "", self.dir.clone()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The temp file is removed if any step fails, and never collides with an
/// existing file next to the target.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory, so the rename stays on one filesystem
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
