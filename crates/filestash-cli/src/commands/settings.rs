//! Store settings command handlers

use anyhow::{bail, Context, Result};

use filestash_core::{FileStore, SettingsPatch};

use crate::output::Output;

/// Show the store's admission settings
pub fn show(store: &FileStore, output: &Output) -> Result<()> {
    output.print_settings(&store.settings());
    Ok(())
}

/// Set a settings value
pub fn set(store: &FileStore, key: String, value: String, output: &Output) -> Result<()> {
    let patch = parse_patch(&key, &value)?;

    if !store.update_settings(patch) {
        bail!("Failed to save settings. See the log for details.");
    }

    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Build a single-field patch from a key/value pair
fn parse_patch(key: &str, value: &str) -> Result<SettingsPatch> {
    let mut patch = SettingsPatch::default();

    match key {
        "max_file_size" => {
            patch.max_file_size = Some(parse_size(value)?);
        }
        "allowed_types" => {
            let types: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            patch.allowed_types = Some(types);
        }
        "compression_quality" => {
            let quality: f64 = value
                .parse()
                .context("Invalid value for compression_quality. Use a number between 0 and 1.")?;
            if !(0.0..=1.0).contains(&quality) {
                bail!("compression_quality must be between 0 and 1, got {}", quality);
            }
            patch.compression_quality = Some(quality);
        }
        _ => {
            bail!(
                "Unknown settings key: '{}'\n\
                 Valid keys: max_file_size, allowed_types, compression_quality",
                key
            );
        }
    }

    Ok(patch)
}

/// Parse a byte count, accepting KB/MB/GB suffixes (binary units)
fn parse_size(value: &str) -> Result<u64> {
    let upper = value.trim().to_uppercase();
    let (number, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = upper.strip_suffix('B') {
        (n, 1)
    } else {
        (upper.as_str(), 1)
    };

    let number: u64 = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid size: '{}'. Use bytes or a KB/MB/GB suffix.", value))?;
    number
        .checked_mul(multiplier)
        .with_context(|| format!("Size too large: '{}'", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestash_core::{MemorySubstrate, PersistentStore};

    use crate::output::OutputFormat;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("10MB").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_size("2 kb").unwrap(), 2048);
        assert_eq!(parse_size("1GB").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("7B").unwrap(), 7);
        assert!(parse_size("ten").is_err());
        assert!(parse_size("-1").is_err());
    }

    #[test]
    fn test_parse_patch_allowed_types() {
        let patch = parse_patch("allowed_types", "text/plain, image/png,,").unwrap();
        assert_eq!(
            patch.allowed_types,
            Some(vec!["text/plain".to_string(), "image/png".to_string()])
        );
        assert!(patch.max_file_size.is_none());
    }

    #[test]
    fn test_parse_patch_rejects_bad_input() {
        assert!(parse_patch("compression_quality", "1.5").is_err());
        assert!(parse_patch("compression_quality", "high").is_err());
        assert!(parse_patch("colour", "blue").is_err());
    }

    #[test]
    fn test_set_persists() {
        let store = FileStore::new(PersistentStore::new(MemorySubstrate::new()));
        let output = Output::new(OutputFormat::Quiet);

        set(&store, "max_file_size".to_string(), "1MB".to_string(), &output).unwrap();
        set(&store, "compression_quality".to_string(), "0.5".to_string(), &output).unwrap();

        let settings = store.settings();
        assert_eq!(settings.max_file_size, 1024 * 1024);
        assert_eq!(settings.compression_quality, 0.5);
        assert_eq!(settings.allowed_types.len(), 11);
    }
}
