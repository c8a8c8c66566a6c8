//! Storage layer
//!
//! Handles document persistence over a string key/value substrate.
//!
//! ## Architecture
//!
//! - **Substrate**: string map (in memory, or one file per key on disk)
//! - **Engine**: owns the single serialized document and its capacity
//!
//! Higher layers never touch the substrate; they go through the engine's
//! read/write pair.

pub mod engine;
pub mod error;
pub mod substrate;

pub use engine::{serialized_len, Diagnostic, DiagnosticHook, PersistentStore, STORAGE_KEY};
pub use error::{StorageError, StorageResult};
pub use substrate::{DirSubstrate, MemorySubstrate, Substrate};
