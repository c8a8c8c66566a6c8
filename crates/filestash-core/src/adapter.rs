//! Reactive adapter
//!
//! `FileManager` turns the pull-style [`FileStore`] into something a UI can
//! observe. It keeps a [`Snapshot`] of the store in a `watch` channel and
//! re-derives it after every mutating call, so subscribers always see the
//! state that follows the last operation.
//!
//! Operations are not serialized here; see the concurrency notes on
//! [`FileStore`].

use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

use crate::binary::{BinarySink, BinarySource};
use crate::models::{Blob, StorageInfo, StoredFile};
use crate::store::FileStore;

/// Progress reported when admission starts
pub const PROGRESS_ADMITTING: u8 = 10;
/// Progress reported once the file is persisted
pub const PROGRESS_PERSISTED: u8 = 90;
/// Progress reported when the upload is finished
pub const PROGRESS_COMPLETE: u8 = 100;

/// Observable state of the store
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub files: Vec<StoredFile>,
    pub storage_info: StorageInfo,
    pub is_loading: bool,
}

/// Result of [`FileManager::upload_file`]
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Stored { file_id: Uuid },
    Failed { error: String },
}

impl UploadOutcome {
    pub fn success(&self) -> bool {
        matches!(self, UploadOutcome::Stored { .. })
    }

    pub fn file_id(&self) -> Option<Uuid> {
        match self {
            UploadOutcome::Stored { file_id } => Some(*file_id),
            UploadOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UploadOutcome::Stored { .. } => None,
            UploadOutcome::Failed { error } => Some(error),
        }
    }
}

/// Observable wrapper around a [`FileStore`]
pub struct FileManager {
    store: FileStore,
    state: watch::Sender<Snapshot>,
}

impl FileManager {
    /// Wrap `store` and load the initial snapshot
    pub fn new(store: FileStore) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        let manager = Self { store, state };
        manager.refresh_files();
        manager
    }

    /// Receiver notified on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.state.borrow().files.clone()
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.state.borrow().storage_info
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Re-read files and storage figures from the store
    pub fn refresh_files(&self) {
        let files = self.store.get_all_files();
        let storage_info = self.store.get_storage_info();
        self.state.send_modify(|s| {
            s.files = files;
            s.storage_info = storage_info;
        });
    }

    /// Admit a file, reporting progress along the way
    ///
    /// Never fails: store errors come back as [`UploadOutcome::Failed`]
    /// carrying the error message.
    pub async fn upload_file<S>(&self, source: &S, on_progress: Option<&dyn Fn(u8)>) -> UploadOutcome
    where
        S: BinarySource + ?Sized,
    {
        let progress = |value: u8| {
            if let Some(report) = on_progress {
                report(value);
            }
        };

        self.set_loading(true);
        progress(PROGRESS_ADMITTING);

        let outcome = match self.store.store_file(source).await {
            Ok(file_id) => {
                progress(PROGRESS_PERSISTED);
                self.refresh_files();
                progress(PROGRESS_COMPLETE);
                UploadOutcome::Stored { file_id }
            }
            Err(e) => {
                warn!(name = %source.meta().name, error = %e, "upload failed");
                UploadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Delete a file, refreshing on success
    pub fn delete_file(&self, id: Uuid) -> bool {
        let deleted = self.store.delete_file(id);
        if deleted {
            self.refresh_files();
        }
        deleted
    }

    /// Export a file to `sink`
    pub fn download_file(&self, id: Uuid, sink: &dyn BinarySink) {
        self.store.export_file(id, sink);
    }

    pub fn get_file_blob(&self, id: Uuid) -> Option<Blob> {
        self.store.get_file_as_blob(id)
    }

    /// Remove every file, refreshing on success
    pub fn clear_all_files(&self) -> bool {
        let cleared = self.store.clear_all_files();
        if cleared {
            self.refresh_files();
        }
        cleared
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_loading != loading;
            s.is_loading = loading;
            changed
        });
    }
}
