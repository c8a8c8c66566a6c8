//! Binary sources and sinks
//!
//! A [`BinarySource`] is where admitted bytes come from; a [`BinarySink`] is
//! where exported bytes go. Hosts supply their own implementations; memory-
//! and filesystem-backed ones are provided here.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::UNIX_EPOCH;

use crate::models::{Blob, FileMeta};
use crate::storage::substrate::atomic_write;

/// Boxed future returned by [`BinarySource::read_bytes`]
pub type ReadFuture<'a> = Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + 'a>>;

/// A candidate file whose bytes are read asynchronously
pub trait BinarySource: Send + Sync {
    /// Metadata as reported before reading
    fn meta(&self) -> &FileMeta;

    /// Read the whole payload
    fn read_bytes(&self) -> ReadFuture<'_>;
}

/// Receives decoded payloads on export
pub trait BinarySink: Send + Sync {
    fn save(&self, blob: &Blob) -> io::Result<()>;
}

/// Source holding its bytes in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    meta: FileMeta,
    bytes: Vec<u8>,
}

impl MemorySource {
    /// Wrap `bytes`; the reported size is their length
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let meta = FileMeta::new(name, bytes.len() as u64, mime_type);
        Self { meta, bytes }
    }

    /// Wrap `bytes` with explicit metadata, which may disagree with them
    pub fn with_meta(meta: FileMeta, bytes: Vec<u8>) -> Self {
        Self { meta, bytes }
    }
}

impl BinarySource for MemorySource {
    fn meta(&self) -> &FileMeta {
        &self.meta
    }

    fn read_bytes(&self) -> ReadFuture<'_> {
        Box::pin(async move { Ok(self.bytes.clone()) })
    }
}

/// Source backed by a file on disk
#[derive(Debug, Clone)]
pub struct PathSource {
    path: PathBuf,
    meta: FileMeta,
}

impl PathSource {
    /// Stat `path` and build its metadata
    ///
    /// The MIME type is guessed from the extension, falling back to
    /// `application/octet-stream`.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        Ok(Self {
            meta: FileMeta {
                name,
                size: metadata.len(),
                mime_type,
                last_modified,
            },
            path,
        })
    }

    /// Replace the guessed MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.meta.mime_type = mime_type.into();
        self
    }

    /// Store under a different name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.meta.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BinarySource for PathSource {
    fn meta(&self) -> &FileMeta {
        &self.meta
    }

    fn read_bytes(&self) -> ReadFuture<'_> {
        Box::pin(tokio::fs::read(&self.path))
    }
}

/// Sink that keeps every exported blob
#[derive(Debug, Default)]
pub struct MemorySink {
    blobs: Mutex<Vec<Blob>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blobs received so far, oldest first
    pub fn blobs(&self) -> Vec<Blob> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BinarySink for MemorySink {
    fn save(&self, blob: &Blob) -> io::Result<()> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(blob.clone());
        Ok(())
    }
}

/// Sink writing each blob into a directory under its original name
///
/// Only the final path component of the name is used, so a stored name can
/// never escape the directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where `blob` will be written
    pub fn target_for(&self, blob: &Blob) -> PathBuf {
        let file_name = Path::new(&blob.name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "download".into());
        self.dir.join(file_name)
    }
}

impl BinarySink for DirectorySink {
    fn save(&self, blob: &Blob) -> io::Result<()> {
        atomic_write(&self.target_for(blob), &blob.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new("a.txt", "text/plain", b"abc".to_vec());
        assert_eq!(source.meta().size, 3);
        assert_eq!(source.meta().mime_type, "text/plain");
        assert_eq!(source.read_bytes().await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_path_source_reads_metadata_and_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        let source = PathSource::open(&path).unwrap();
        assert_eq!(source.meta().name, "report.csv");
        assert_eq!(source.meta().size, 8);
        assert_eq!(source.meta().mime_type, "text/csv");
        assert!(source.meta().last_modified > 0);
        assert_eq!(source.read_bytes().await.unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_path_source_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.unknownext");
        std::fs::write(&path, b"x").unwrap();

        let source = PathSource::open(&path).unwrap();
        assert_eq!(source.meta().mime_type, "application/octet-stream");

        let source = source.with_mime_type("text/plain").with_name("renamed.txt");
        assert_eq!(source.meta().mime_type, "text/plain");
        assert_eq!(source.meta().name, "renamed.txt");
    }

    #[test]
    fn test_path_source_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(PathSource::open(temp_dir.path()).is_err());
        assert!(PathSource::open(temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_directory_sink_writes_under_name() {
        let temp_dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp_dir.path());
        let blob = Blob {
            name: "photo.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0, 1, 2, 255],
        };

        sink.save(&blob).unwrap();
        assert_eq!(
            std::fs::read(temp_dir.path().join("photo.png")).unwrap(),
            vec![0, 1, 2, 255]
        );
    }

    #[test]
    fn test_directory_sink_leaves_sibling_files_alone() {
        let temp_dir = TempDir::new().unwrap();
        let sibling = temp_dir.path().join("photo.tmp");
        std::fs::write(&sibling, b"user data").unwrap();
        let sink = DirectorySink::new(temp_dir.path());
        let blob = Blob {
            name: "photo.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![7, 8, 9],
        };

        sink.save(&blob).unwrap();

        assert_eq!(std::fs::read(&sibling).unwrap(), b"user data");
        assert_eq!(std::fs::read(temp_dir.path().join("photo.png")).unwrap(), vec![7, 8, 9]);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_directory_sink_replaces_existing_export() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"old").unwrap();
        let sink = DirectorySink::new(temp_dir.path());
        let blob = Blob {
            name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: b"new".to_vec(),
        };

        sink.save(&blob).unwrap();
        assert_eq!(std::fs::read(temp_dir.path().join("notes.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_directory_sink_strips_directories_from_name() {
        let temp_dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp_dir.path().join("out"));
        let blob = Blob {
            name: "../../escape.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: b"x".to_vec(),
        };

        assert_eq!(sink.target_for(&blob), temp_dir.path().join("out").join("escape.txt"));

        let blob = Blob {
            name: "..".to_string(),
            ..blob
        };
        assert_eq!(sink.target_for(&blob), temp_dir.path().join("out").join("download"));
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        let blob = Blob {
            name: "a".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: vec![1],
        };
        sink.save(&blob).unwrap();
        sink.save(&blob).unwrap();
        assert_eq!(sink.blobs().len(), 2);
    }
}
