//! Admission policy
//!
//! A candidate is checked against the store settings before any bytes are
//! read. Size is checked first, then type; only the first failure is
//! reported.

use thiserror::Error;

use crate::models::{FileMeta, StoreSettings};

/// Why a candidate was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Payload is larger than `maxFileSize`
    #[error("File size exceeds {limit_mb}MB limit")]
    TooLarge { limit_mb: u64 },

    /// MIME type is not in the allow-list
    #[error("File type {mime_type} is not allowed")]
    TypeNotAllowed { mime_type: String },
}

/// Check a candidate against the admission rules
pub fn validate(candidate: &FileMeta, settings: &StoreSettings) -> Result<(), Rejection> {
    check_size(candidate.size, settings)?;

    if !settings.allows(&candidate.mime_type) {
        return Err(Rejection::TypeNotAllowed {
            mime_type: candidate.mime_type.clone(),
        });
    }

    Ok(())
}

/// Size rule on its own, for payloads whose real length differs from the
/// reported one
pub fn check_size(size: u64, settings: &StoreSettings) -> Result<(), Rejection> {
    if size > settings.max_file_size {
        return Err(Rejection::TooLarge {
            limit_mb: limit_in_mb(settings.max_file_size),
        });
    }
    Ok(())
}

fn limit_in_mb(bytes: u64) -> u64 {
    (bytes as f64 / 1024.0 / 1024.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn candidate(size: u64, mime_type: &str) -> FileMeta {
        FileMeta {
            name: "candidate".to_string(),
            size,
            mime_type: mime_type.to_string(),
            last_modified: 0,
        }
    }

    #[test]
    fn test_accepts_allowed_file_within_limit() {
        let settings = StoreSettings::default();
        assert_eq!(validate(&candidate(10, "text/plain"), &settings), Ok(()));
        assert_eq!(validate(&candidate(5 * MIB, "image/png"), &settings), Ok(()));
    }

    #[test]
    fn test_rejects_oversized_file_with_limit_in_message() {
        let settings = StoreSettings::default();
        let err = validate(&candidate(6 * MIB, "image/png"), &settings).unwrap_err();

        assert_eq!(err, Rejection::TooLarge { limit_mb: 5 });
        assert_eq!(err.to_string(), "File size exceeds 5MB limit");
    }

    #[test]
    fn test_size_is_checked_before_type() {
        let settings = StoreSettings::default();
        for mime_type in ["text/plain", "application/zip", ""] {
            let err = validate(&candidate(5 * MIB + 1, mime_type), &settings).unwrap_err();
            assert!(matches!(err, Rejection::TooLarge { .. }), "{}", mime_type);
        }
    }

    #[test]
    fn test_rejects_type_outside_allow_list() {
        let settings = StoreSettings::default();
        let err = validate(&candidate(10, "application/zip"), &settings).unwrap_err();

        assert_eq!(
            err,
            Rejection::TypeNotAllowed {
                mime_type: "application/zip".to_string()
            }
        );
        assert!(err.to_string().contains("application/zip"));
    }

    #[test]
    fn test_no_wildcard_or_prefix_matching() {
        let mut settings = StoreSettings::default();
        settings.allowed_types = vec!["image/*".to_string(), "text".to_string()];

        assert!(validate(&candidate(1, "image/png"), &settings).is_err());
        assert!(validate(&candidate(1, "text/plain"), &settings).is_err());
        assert!(validate(&candidate(1, "image/*"), &settings).is_ok());
    }

    #[test]
    fn test_limit_is_rounded() {
        let mut settings = StoreSettings::default();
        settings.max_file_size = 1536 * 1024;
        let err = validate(&candidate(2 * MIB, "text/plain"), &settings).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 2MB limit");

        settings.max_file_size = 1200 * 1024;
        let err = validate(&candidate(2 * MIB, "text/plain"), &settings).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 1MB limit");
    }
}
