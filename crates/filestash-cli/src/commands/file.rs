//! File command handlers

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use filestash_core::{BinarySink, DirectorySink, FileManager, FileStore, PathSource};

use crate::output::Output;
use crate::prompt::confirm;

/// Add a file from disk
pub async fn add(
    manager: &FileManager,
    path: PathBuf,
    mime_type: Option<String>,
    name: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut source = PathSource::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    if let Some(mime_type) = mime_type {
        source = source.with_mime_type(mime_type);
    }
    if let Some(name) = name {
        source = source.with_name(name);
    }

    let show_progress = output.should_prompt();
    let report = |percent: u8| {
        if show_progress {
            eprint!("\rUploading... {:>3}%", percent);
            let _ = io::stderr().flush();
        }
    };

    let outcome = manager.upload_file(&source, Some(&report)).await;
    if show_progress {
        eprintln!();
    }

    let Some(id) = outcome.file_id() else {
        bail!("{}", outcome.error().unwrap_or("Upload failed"));
    };

    let file = manager
        .store()
        .get_file(id)
        .ok_or_else(|| anyhow!("File vanished after upload: {}", id))?;

    output.success(&format!("Stored file: {}", id));
    output.print_file(&file);
    Ok(())
}

/// List all files
pub fn list(manager: &FileManager, output: &Output) -> Result<()> {
    output.print_files(&manager.files());
    Ok(())
}

/// Show a single file
pub fn show(store: &FileStore, id: String, output: &Output) -> Result<()> {
    let uuid = parse_file_id(&id, store)?;

    let file = store
        .get_file(uuid)
        .ok_or_else(|| anyhow!("File not found: {}", id))?;

    output.print_file(&file);
    Ok(())
}

/// Export a file into a directory
pub fn export(manager: &FileManager, id: String, out: Option<PathBuf>, output: &Output) -> Result<()> {
    let uuid = parse_file_id(&id, manager.store())?;

    let blob = manager
        .get_file_blob(uuid)
        .ok_or_else(|| anyhow!("File {} is missing or its stored data is corrupt", id))?;

    let sink = DirectorySink::new(out.unwrap_or_else(|| PathBuf::from(".")));
    let target = sink.target_for(&blob);
    sink.save(&blob)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    output.success(&format!("Exported {} to {}", blob.name, target.display()));
    Ok(())
}

/// Delete a file
pub fn delete(manager: &FileManager, id: String, yes: bool, output: &Output) -> Result<()> {
    let uuid = parse_file_id(&id, manager.store())?;

    let file = manager
        .store()
        .get_file(uuid)
        .ok_or_else(|| anyhow!("File not found: {}", id))?;

    if output.should_prompt() && !yes {
        println!("Delete file: {} - {}", &file.id.to_string()[..8], file.name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !manager.delete_file(uuid) {
        bail!("Failed to delete file {}. See the log for details.", uuid);
    }

    output.success(&format!("Deleted file: {}", uuid));
    Ok(())
}

/// Delete every file, keeping settings
pub fn clear(manager: &FileManager, yes: bool, output: &Output) -> Result<()> {
    let count = manager.files().len();
    if count == 0 {
        output.message("No files stored.");
        return Ok(());
    }

    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to clear {} file(s) without --yes", count);
        }
        println!("Delete all {} file(s)?", count);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !manager.clear_all_files() {
        bail!("Failed to clear files. See the log for details.");
    }

    output.success(&format!("Deleted {} file(s)", count));
    Ok(())
}

/// Parse a file ID (supports full UUID or prefix)
fn parse_file_id(id: &str, store: &FileStore) -> Result<Uuid> {
    // Try full UUID first
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches = store.find_by_prefix(id);

    match matches.len() {
        0 => bail!("No file found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple files match '{}':", id);
            for file in &matches {
                eprintln!("  {} - {}", file.id, file.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
