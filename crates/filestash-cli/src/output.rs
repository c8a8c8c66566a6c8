//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use filestash_core::{StorageInfo, StoreSettings, StoredFile};
use serde_json::json;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single file's details (never its payload)
    pub fn print_file(&self, file: &StoredFile) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", file.id);
                println!("Name:      {}", file.name);
                println!("Type:      {} ({})", file.mime_type, file.kind().label());
                println!("Size:      {}", human_size(file.size));
                println!(
                    "Uploaded:  {}",
                    file.upload_date.format("%Y-%m-%d %H:%M")
                );
                if let Some(modified) =
                    chrono::DateTime::from_timestamp_millis(file.last_modified)
                {
                    println!("Modified:  {}", modified.format("%Y-%m-%d %H:%M"));
                }
                if !file.checksum.is_empty() {
                    println!("SHA-256:   {}", file.checksum);
                }
                if !file.is_intact() {
                    println!("Status:    corrupt (payload does not match its size or checksum)");
                }
            }
            OutputFormat::Json => {
                println!("{}", file_summary(file));
            }
            OutputFormat::Quiet => {
                println!("{}", file.id);
            }
        }
    }

    /// Print a list of files
    pub fn print_files(&self, files: &[StoredFile]) {
        match self.format {
            OutputFormat::Human => {
                if files.is_empty() {
                    println!("No files stored.");
                    return;
                }
                for file in files {
                    println!(
                        "{} | {:<5} | {:>9} | {}",
                        &file.id.to_string()[..8],
                        file.kind().label(),
                        human_size(file.size),
                        truncate(&file.name, 50)
                    );
                }
                println!("\n{} file(s)", files.len());
            }
            OutputFormat::Json => {
                let summaries: Vec<_> = files.iter().map(file_summary).collect();
                println!("{}", serde_json::Value::Array(summaries));
            }
            OutputFormat::Quiet => {
                for file in files {
                    println!("{}", file.id);
                }
            }
        }
    }

    /// Print capacity figures
    pub fn print_storage_info(&self, info: &StorageInfo, capacity: usize) {
        match self.format {
            OutputFormat::Human => {
                println!("Storage:");
                println!("  Files:     {}", info.file_count);
                println!(
                    "  Used:      {} of {} ({:.1}%)",
                    human_size(info.used as u64),
                    human_size(capacity as u64),
                    info.used_percentage
                );
                if info.available >= 0 {
                    println!("  Available: {}", human_size(info.available as u64));
                } else {
                    println!(
                        "  Available: none ({} over capacity)",
                        human_size(info.available.unsigned_abs())
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", json!(info));
            }
            OutputFormat::Quiet => {
                println!("{}", info.used);
            }
        }
    }

    /// Print store settings
    pub fn print_settings(&self, settings: &StoreSettings) {
        match self.format {
            OutputFormat::Human => {
                println!("Settings:");
                println!("  max_file_size:       {}", human_size(settings.max_file_size));
                println!("  compression_quality: {}", settings.compression_quality);
                println!("  allowed_types:");
                for mime_type in &settings.allowed_types {
                    println!("    {}", mime_type);
                }
            }
            OutputFormat::Json => {
                println!("{}", json!(settings));
            }
            OutputFormat::Quiet => {
                println!("{}", settings.max_file_size);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// JSON view of a file without its payload
fn file_summary(file: &StoredFile) -> serde_json::Value {
    json!({
        "id": file.id,
        "name": file.name,
        "size": file.size,
        "type": file.mime_type,
        "kind": file.kind(),
        "uploadDate": file.upload_date,
        "lastModified": file.last_modified,
        "checksum": file.checksum,
    })
}

/// Format a byte count with binary units
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
