//! FileStash Core Library
//!
//! This crate provides the core functionality for FileStash, a
//! quota-bounded store that keeps arbitrary binary files inside a
//! string-only key/value substrate.
//!
//! # Architecture
//!
//! - **Codec**: binary payloads are kept as base64 text
//! - **Validator**: size and type admission rules
//! - **Engine**: one JSON document per store, rewritten whole on each
//!   mutation and refused when it would exceed capacity
//! - **FileStore**: typed CRUD over the engine
//! - **FileManager**: observable snapshot for UIs
//!
//! # Quick Start
//!
//! ```text
//! let store = FileStore::new(PersistentStore::new(MemorySubstrate::new()));
//!
//! let source = MemorySource::new("a.txt", "text/plain", b"hello".to_vec());
//! let id = store.store_file(&source).await?;
//!
//! let blob = store.get_file_as_blob(id);
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `adapter`: Observable wrapper for UI hosts
//! - `models`: Stored records, settings, and view types
//! - `storage`: Substrates and the persistent engine
//! - `binary`: Sources and sinks for file bytes
//! - `codec`: Base64 conversion
//! - `validate`: Admission policy
//! - `config`: Application configuration

pub mod adapter;
pub mod binary;
pub mod codec;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod validate;

pub use adapter::{FileManager, Snapshot, UploadOutcome};
pub use binary::{BinarySink, BinarySource, DirectorySink, MemorySink, MemorySource, PathSource};
pub use codec::CodecError;
pub use config::Config;
pub use models::{
    Blob, FileKind, FileMeta, SettingsPatch, StorageInfo, StoreDocument, StoreSettings,
    StoredFile, MAX_STORAGE_SIZE,
};
pub use storage::{
    DirSubstrate, MemorySubstrate, PersistentStore, StorageError, StorageResult, Substrate,
};
pub use store::FileStore;
pub use validate::Rejection;
