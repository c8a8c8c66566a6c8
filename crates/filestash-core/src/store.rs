//! Unified storage interface
//!
//! The `FileStore` is the typed CRUD surface over the persistent engine.
//! Every call reads the whole document, works on that copy, and writes the
//! whole document back, so sequential calls always observe each other.
//!
//! ## Usage
//!
//! ```ignore
//! let store = FileStore::open(&Config::load()?);
//!
//! let source = PathSource::open("report.pdf")?;
//! let id = store.store_file(&source).await?;
//!
//! let files = store.get_all_files();
//! store.export_file(id, &DirectorySink::new("."));
//! ```
//!
//! ## Concurrency
//!
//! `store_file` reads the document before awaiting the source's bytes. Two
//! calls interleaved around that await each write back their own copy and
//! one of the mutations is lost without an error. Hosts that upload
//! concurrently must serialize the calls themselves.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::binary::{BinarySink, BinarySource};
use crate::codec;
use crate::config::Config;
use crate::models::{Blob, SettingsPatch, StorageInfo, StoreSettings, StoredFile};
use crate::storage::{
    serialized_len, DirSubstrate, PersistentStore, StorageError, StorageResult,
};
use crate::validate::{check_size, validate};

/// Handle to a file store
///
/// Cheap to clone; clones share the same engine.
#[derive(Clone)]
pub struct FileStore {
    engine: Arc<PersistentStore>,
}

impl FileStore {
    /// Wrap an engine
    pub fn new(engine: PersistentStore) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Open the on-disk store described by `config`
    pub fn open(config: &Config) -> Self {
        let substrate = DirSubstrate::new(config.data_dir.clone());
        let engine = PersistentStore::new(substrate).with_capacity(config.capacity_bytes);
        info!(
            data_dir = %config.data_dir.display(),
            capacity = config.capacity_bytes,
            "file store opened"
        );
        Self::new(engine)
    }

    /// The underlying engine
    pub fn engine(&self) -> &PersistentStore {
        &self.engine
    }

    // ==================== File Operations ====================

    /// Admit a file and return its new id
    ///
    /// The candidate is validated on its reported metadata, then its bytes
    /// are read and encoded. Nothing is persisted unless every step
    /// succeeds.
    pub async fn store_file<S>(&self, source: &S) -> StorageResult<Uuid>
    where
        S: BinarySource + ?Sized,
    {
        let meta = source.meta().clone();
        let mut doc = self.engine.read();

        if let Err(rejection) = validate(&meta, &doc.settings) {
            info!(name = %meta.name, reason = %rejection, "file rejected");
            return Err(rejection.into());
        }

        let bytes = source
            .read_bytes()
            .await
            .map_err(|e| StorageError::SourceRead {
                name: meta.name.clone(),
                source: e,
            })?;

        if bytes.len() as u64 != meta.size {
            debug!(
                name = %meta.name,
                reported = meta.size,
                actual = bytes.len(),
                "payload size differs from reported size"
            );
        }
        check_size(bytes.len() as u64, &doc.settings)?;

        let mut file = StoredFile::new(&meta, &bytes);
        while doc.find(file.id).is_some() {
            file.id = Uuid::new_v4();
        }
        let id = file.id;
        let size = file.size;
        doc.files.push(file);

        self.engine.write(&doc)?;

        info!(%id, name = %meta.name, size, "file stored");
        Ok(id)
    }

    /// Get a file by ID
    pub fn get_file(&self, id: Uuid) -> Option<StoredFile> {
        self.engine.read().find(id).cloned()
    }

    /// Get all files, in insertion order
    pub fn get_all_files(&self) -> Vec<StoredFile> {
        self.engine.read().files
    }

    /// Files whose id starts with `prefix`
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<StoredFile> {
        let prefix = prefix.to_lowercase();
        self.engine
            .read()
            .files
            .into_iter()
            .filter(|f| f.id.to_string().starts_with(&prefix))
            .collect()
    }

    /// Delete a file
    ///
    /// Returns whether a record was removed and persisted. An unknown id is
    /// a no-op and leaves the stored document untouched.
    pub fn delete_file(&self, id: Uuid) -> bool {
        let mut doc = self.engine.read();
        let Some(removed) = doc.remove(id) else {
            debug!(%id, "delete of unknown file ignored");
            return false;
        };

        match self.engine.write(&doc) {
            Ok(_) => {
                info!(%id, name = %removed.name, "file deleted");
                true
            }
            Err(e) => {
                error!(%id, error = %e, "failed to persist deletion");
                false
            }
        }
    }

    /// Remove every file, keeping settings
    pub fn clear_all_files(&self) -> bool {
        let mut doc = self.engine.read();
        let count = doc.files.len();
        doc.files.clear();

        match self.engine.write(&doc) {
            Ok(_) => {
                info!(count, "all files cleared");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to persist clear");
                false
            }
        }
    }

    /// Decode a file's payload
    ///
    /// Returns `None` when the file is absent or its data is corrupt.
    pub fn get_file_as_blob(&self, id: Uuid) -> Option<Blob> {
        let file = self.get_file(id)?;
        match decode_payload(&file) {
            Ok(bytes) => Some(Blob {
                name: file.name,
                mime_type: file.mime_type,
                bytes,
            }),
            Err(e) => {
                warn!(%id, error = %e, "stored payload is corrupt");
                None
            }
        }
    }

    /// Hand a file's decoded payload to `sink`
    ///
    /// Does nothing when the payload is unavailable; sink failures are
    /// logged.
    pub fn export_file(&self, id: Uuid, sink: &dyn BinarySink) {
        let Some(blob) = self.get_file_as_blob(id) else {
            return;
        };
        match sink.save(&blob) {
            Ok(()) => info!(%id, name = %blob.name, bytes = blob.bytes.len(), "file exported"),
            Err(e) => error!(%id, error = %e, "export failed"),
        }
    }

    // ==================== Stats ====================

    /// Capacity accounting for the current document
    pub fn get_storage_info(&self) -> StorageInfo {
        let doc = self.engine.read();
        StorageInfo::compute(serialized_len(&doc), self.engine.capacity(), doc.files.len())
    }

    // ==================== Settings ====================

    /// Current settings
    pub fn settings(&self) -> StoreSettings {
        self.engine.read().settings
    }

    /// Shallow-merge `patch` into the settings and persist
    ///
    /// Returns `false` without writing when the merged settings are invalid.
    pub fn update_settings(&self, patch: SettingsPatch) -> bool {
        let mut doc = self.engine.read();
        doc.settings.apply(patch);

        if let Err(e) = check_settings(&doc.settings) {
            warn!(error = %e, "settings update refused");
            return false;
        }

        match self.engine.write(&doc) {
            Ok(_) => {
                info!(
                    max_file_size = doc.settings.max_file_size,
                    allowed_types = doc.settings.allowed_types.len(),
                    "settings updated"
                );
                true
            }
            Err(e) => {
                error!(error = %e, "failed to persist settings");
                false
            }
        }
    }
}

/// Decode a record's payload and verify it against its checksum
fn decode_payload(file: &StoredFile) -> StorageResult<Vec<u8>> {
    let bytes = codec::decode(&file.data)?;
    if !file.matches_checksum(&bytes) {
        return Err(StorageError::ChecksumMismatch { id: file.id });
    }
    Ok(bytes)
}

fn check_settings(settings: &StoreSettings) -> StorageResult<()> {
    if !settings.is_valid() {
        return Err(StorageError::InvalidSettings {
            reason: format!(
                "compression_quality must be between 0 and 1, got {}",
                settings.compression_quality
            ),
        });
    }
    Ok(())
}
