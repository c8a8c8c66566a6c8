//! Status command handler

use anyhow::Result;

use filestash_core::{Config, FileManager};

use crate::output::{Output, OutputFormat};

/// Show storage usage and location
pub fn show(manager: &FileManager, config: &Config, output: &Output) -> Result<()> {
    let info = manager.storage_info();
    let capacity = manager.store().engine().capacity();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "capacity": capacity,
                    "storage": info,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", info.used);
        }
        OutputFormat::Human => {
            println!("FileStash Status");
            println!("================");
            println!();
            println!("Location: {}", config.data_dir.display());
            println!();
            output.print_storage_info(&info, capacity);
        }
    }

    Ok(())
}
