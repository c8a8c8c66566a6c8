//! Data models for FileStash
//!
//! Defines the persisted shapes (`StoredFile`, `StoreSettings`,
//! `StoreDocument`) and the small view types handed across the crate
//! boundary. Field names serialize in camelCase because the whole document
//! lives as JSON text in the substrate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec;

/// Capacity ceiling of the substrate, in bytes of serialized document
pub const MAX_STORAGE_SIZE: usize = 50 * 1024 * 1024;

/// Default per-file admission ceiling
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default compression hint
pub const DEFAULT_COMPRESSION_QUALITY: f64 = 0.8;

/// MIME types admitted by default
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
];

/// A file held in the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Unique identifier, assigned at admission
    pub id: Uuid,
    /// Original file name, as given by the source
    pub name: String,
    /// Length of the original payload in bytes
    pub size: u64,
    /// MIME type reported by the source
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 text of the payload
    pub data: String,
    /// When the file was admitted
    pub upload_date: DateTime<Utc>,
    /// Source modification time, epoch milliseconds
    pub last_modified: i64,
    /// SHA-256 of the payload, lowercase hex. Empty on records written
    /// before checksums were kept.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,
}

impl StoredFile {
    /// Build a record for freshly admitted bytes
    pub fn new(meta: &FileMeta, bytes: &[u8]) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: meta.name.clone(),
            size: bytes.len() as u64,
            mime_type: meta.mime_type.clone(),
            data: codec::encode(bytes),
            upload_date: Utc::now(),
            last_modified: meta.last_modified,
            checksum: codec::checksum(bytes),
        }
    }

    /// Whether `bytes` match the recorded checksum
    ///
    /// Records without a checksum accept any bytes.
    pub fn matches_checksum(&self, bytes: &[u8]) -> bool {
        self.checksum.is_empty() || self.checksum == codec::checksum(bytes)
    }

    /// Whether `data` decodes to exactly `size` bytes matching the checksum
    pub fn is_intact(&self) -> bool {
        if codec::decoded_len(&self.data) != Some(self.size as usize) {
            return false;
        }
        match codec::decode(&self.data) {
            Ok(bytes) => self.matches_checksum(&bytes),
            Err(_) => false,
        }
    }

    /// Coarse category of this file
    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }
}

/// Admission policy and hints, one per store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    /// Maximum payload size in bytes
    pub max_file_size: u64,
    /// MIME types admitted by exact match
    pub allowed_types: Vec<String>,
    /// Reserved hint in [0, 1]; not enforced here
    pub compression_quality: f64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            compression_quality: DEFAULT_COMPRESSION_QUALITY,
        }
    }
}

impl StoreSettings {
    /// Whether every field can be stored and read back
    ///
    /// A non-finite quality serializes as `null`, which would make the
    /// whole document unreadable.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.compression_quality)
    }

    /// Whether `mime_type` is in the allow-list
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Shallow-merge a patch over these settings
    ///
    /// Fields absent from the patch keep their current value. Allowed types
    /// are deduplicated, first occurrence wins.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(max_file_size) = patch.max_file_size {
            self.max_file_size = max_file_size;
        }
        if let Some(types) = patch.allowed_types {
            let mut deduped: Vec<String> = Vec::with_capacity(types.len());
            for t in types {
                if !deduped.contains(&t) {
                    deduped.push(t);
                }
            }
            self.allowed_types = deduped;
        }
        if let Some(quality) = patch.compression_quality {
            self.compression_quality = quality;
        }
    }
}

/// Partial settings for [`StoreSettings::apply`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_quality: Option<f64>,
}

/// The whole persisted unit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreDocument {
    /// Stored files, in insertion order
    #[serde(default)]
    pub files: Vec<StoredFile>,
    /// Store settings; defaults are materialized when missing
    #[serde(default)]
    pub settings: StoreSettings,
}

impl StoreDocument {
    /// Find a record by id
    pub fn find(&self, id: Uuid) -> Option<&StoredFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Remove a record by id, returning it if present
    pub fn remove(&mut self, id: Uuid) -> Option<StoredFile> {
        let pos = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(pos))
    }
}

/// Metadata a binary source reports before its bytes are read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Epoch milliseconds
    pub last_modified: i64,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            last_modified: Utc::now().timestamp_millis(),
        }
    }
}

/// Decoded payload handed to a binary sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Capacity accounting for the current document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    /// Serialized length of the document
    pub used: usize,
    /// Capacity minus used; negative only for a document written under a
    /// larger capacity than the current one
    pub available: i64,
    pub file_count: usize,
    pub used_percentage: f64,
}

impl StorageInfo {
    /// Compute the figures for a document of `used` bytes
    pub fn compute(used: usize, capacity: usize, file_count: usize) -> Self {
        let used_percentage = if capacity == 0 {
            100.0
        } else {
            used as f64 / capacity as f64 * 100.0
        };
        Self {
            used,
            available: capacity as i64 - used as i64,
            file_count,
            used_percentage,
        }
    }
}

/// Coarse file category derived from MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Document,
    Spreadsheet,
    Text,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            FileKind::Image
        } else if mime_type == "application/pdf" {
            FileKind::Pdf
        } else if mime_type.contains("word") {
            FileKind::Document
        } else if mime_type.contains("excel") || mime_type.contains("sheet") {
            FileKind::Spreadsheet
        } else if mime_type.starts_with("text/") {
            FileKind::Text
        } else {
            FileKind::Other
        }
    }

    /// Short label for listings
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
            FileKind::Document => "doc",
            FileKind::Spreadsheet => "sheet",
            FileKind::Text => "text",
            FileKind::Other => "file",
        }
    }
}
