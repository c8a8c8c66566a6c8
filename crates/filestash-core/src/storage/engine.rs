//! Persistent document engine
//!
//! The engine is the only component that talks to the substrate. The whole
//! [`StoreDocument`] lives under a single key as JSON; every write replaces
//! it as one unit, and a write whose serialized form would exceed the
//! capacity is refused before the substrate is touched.
//!
//! Reads never fail: an empty, unreadable or corrupt value yields a fresh
//! default document. Recovered failures are logged and, when a hook is
//! registered, reported as a [`Diagnostic`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::substrate::Substrate;
use crate::models::{StoreDocument, MAX_STORAGE_SIZE};

/// Substrate key holding the serialized document
pub const STORAGE_KEY: &str = "file_storage";

/// A failure the engine recovered from on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The stored value is not a valid document
    CorruptDocument { key: String, details: String },
    /// The substrate could not be read
    ReadFailed { key: String, details: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CorruptDocument { key, details } => {
                write!(f, "document under '{}' is corrupt: {}", key, details)
            }
            Diagnostic::ReadFailed { key, details } => {
                write!(f, "could not read '{}': {}", key, details)
            }
        }
    }
}

/// Callback receiving recovered failures
pub type DiagnosticHook = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Sole reader/writer of the serialized document
pub struct PersistentStore {
    substrate: Arc<dyn Substrate>,
    key: String,
    capacity: usize,
    diagnostics: Option<DiagnosticHook>,
}

impl PersistentStore {
    /// Create an engine over `substrate` with the default key and capacity
    pub fn new(substrate: impl Substrate + 'static) -> Self {
        Self::from_shared(Arc::new(substrate))
    }

    /// Create an engine over an already shared substrate
    pub fn from_shared(substrate: Arc<dyn Substrate>) -> Self {
        Self {
            substrate,
            key: STORAGE_KEY.to_string(),
            capacity: MAX_STORAGE_SIZE,
            diagnostics: None,
        }
    }

    /// Override the capacity ceiling
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Override the substrate key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Register a hook for recovered read failures
    pub fn with_diagnostics(mut self, hook: impl Fn(&Diagnostic) + Send + Sync + 'static) -> Self {
        self.diagnostics = Some(Arc::new(hook));
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the current document, or a default one
    pub fn read(&self) -> StoreDocument {
        let raw = match self.substrate.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no stored document, using defaults");
                return StoreDocument::default();
            }
            Err(e) => {
                self.report(Diagnostic::ReadFailed {
                    key: self.key.clone(),
                    details: e.to_string(),
                });
                return StoreDocument::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                self.report(Diagnostic::CorruptDocument {
                    key: self.key.clone(),
                    details: e.to_string(),
                });
                StoreDocument::default()
            }
        }
    }

    /// Replace the stored document
    ///
    /// Returns the serialized length on success. Nothing is written when
    /// the document does not fit.
    pub fn write(&self, doc: &StoreDocument) -> StorageResult<usize> {
        let serialized = serde_json::to_string(doc)?;
        let required = serialized.len();

        if required > self.capacity {
            warn!(
                key = %self.key,
                required,
                capacity = self.capacity,
                "write refused, document exceeds capacity"
            );
            return Err(StorageError::QuotaExceeded {
                required,
                capacity: self.capacity,
            });
        }

        self.substrate.set(&self.key, &serialized)?;
        debug!(key = %self.key, bytes = required, files = doc.files.len(), "document written");
        Ok(required)
    }

    /// Drop the stored document entirely
    pub fn clear(&self) -> StorageResult<()> {
        self.substrate.remove(&self.key)
    }

    /// Stored value exactly as the substrate holds it
    pub fn raw(&self) -> StorageResult<Option<String>> {
        self.substrate.get(&self.key)
    }

    /// Serialized length of the current document
    pub fn used_bytes(&self) -> usize {
        serialized_len(&self.read())
    }

    fn report(&self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "recovered with a default document");
        if let Some(hook) = &self.diagnostics {
            hook(&diagnostic);
        }
    }
}

/// Serialized length of `doc`
pub fn serialized_len(doc: &StoreDocument) -> usize {
    serde_json::to_string(doc).map(|s| s.len()).unwrap_or(0)
}
