//! Logging setup
//!
//! Level comes from FILESTASH_LOG (default `warn`). Logs go to the
//! configured log file when one is set and can be opened, otherwise to
//! stderr.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use filestash_core::Config;

/// Default level when FILESTASH_LOG is unset
const DEFAULT_LEVEL: &str = "warn";

/// Initialize logging for the CLI
pub fn init(config: &Config) {
    let log_level = std::env::var("FILESTASH_LOG").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    let env_filter = EnvFilter::new(filter_directive(&log_level));

    let log_file = config.log_file.as_deref().and_then(open_log_file);

    // Ignore error if already initialized
    match log_file {
        Some((path, file)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            tracing::info!("logging initialized to {:?}", path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

/// Open the log file for appending, warning on stderr if it can't be
fn open_log_file(path: &Path) -> Option<(&Path, File)> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some((path, file)),
        Err(e) => {
            eprintln!(
                "Warning: Could not open log file {:?}: {}. Logging to stderr.",
                path, e
            );
            None
        }
    }
}

fn filter_directive(level: &str) -> String {
    format!("filestash_core={},filestash_cli={}", level, level)
}
