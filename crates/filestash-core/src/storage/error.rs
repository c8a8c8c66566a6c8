//! Storage error handling
//!
//! Provides typed errors for store operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::codec::CodecError;
use crate::validate::Rejection;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Candidate refused by the admission policy
    #[error("{0}")]
    ValidationFailed(#[from] Rejection),

    /// Serialized document would not fit in the substrate
    #[error(
        "Storage quota exceeded: document would take {required} bytes of {capacity} available. Delete some files and try again."
    )]
    QuotaExceeded { required: usize, capacity: usize },

    /// Substrate refused or failed the write
    #[error("Failed to persist '{key}': {source}")]
    PersistFailed {
        key: String,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing substrate storage
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk underneath the substrate is full
    #[error("Disk full while writing to '{path}'. Free up disk space and try again.")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Could not read the payload from its source
    #[error("Failed to read '{name}': {source}")]
    SourceRead {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Document could not be serialized
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored payload is corrupt
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Stored payload decodes but does not match its checksum
    #[error("Stored data for file {id} does not match its checksum")]
    ChecksumMismatch { id: Uuid },

    /// Settings would not survive a write and read back
    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, key: &str, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::PersistFailed {
                key: key.to_string(),
                source: error,
            },
        }
    }

    /// Whether the substrate itself failed (as opposed to policy or quota)
    pub fn is_persist_failure(&self) -> bool {
        matches!(
            self,
            StorageError::PersistFailed { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::DiskFull { .. }
        )
    }

    /// Check if this error is recoverable by the user
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::ValidationFailed(_)
                | StorageError::QuotaExceeded { .. }
                | StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::QuotaExceeded { .. } => {
                Some("Delete files you no longer need, then try again.")
            }
            StorageError::ValidationFailed(Rejection::TooLarge { .. }) => {
                Some("Raise max_file_size in the store settings or pick a smaller file.")
            }
            StorageError::ValidationFailed(Rejection::TypeNotAllowed { .. }) => {
                Some("Add the type to allowed_types in the store settings.")
            }
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions of the data directory.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, "file_storage", PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.is_persist_failure());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, "file_storage", PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_other_io_is_persist_failed() {
        let io_err = io::Error::new(io::ErrorKind::Other, "device unplugged");
        let err = StorageError::from_io(io_err, "file_storage", PathBuf::from("/x"));

        assert!(matches!(err, StorageError::PersistFailed { ref key, .. } if key == "file_storage"));
        assert!(err.is_persist_failure());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = StorageError::from(Rejection::TooLarge { limit_mb: 5 });
        assert_eq!(err.to_string(), "File size exceeds 5MB limit");
        assert!(!err.is_persist_failure());
    }

    #[test]
    fn test_corruption_errors_are_not_recoverable() {
        let err = StorageError::ChecksumMismatch { id: Uuid::nil() };
        assert!(err.to_string().contains("checksum"));
        assert!(!err.is_recoverable());

        let decode_err = crate::codec::decode("%%%").unwrap_err();
        let err = StorageError::from(decode_err);
        assert!(matches!(err, StorageError::Codec(_)));
        assert!(!err.is_persist_failure());
    }

    #[test]
    fn test_quota_display() {
        let err = StorageError::QuotaExceeded {
            required: 120,
            capacity: 100,
        };

        let msg = err.to_string();
        assert!(msg.contains("quota exceeded"));
        assert!(msg.contains("120"));
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
    }
}
