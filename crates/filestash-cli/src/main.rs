//! FileStash CLI
//!
//! Command-line interface for FileStash - a quota-bounded file store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use filestash_core::{Config, FileManager, FileStore};

mod commands;
mod logging;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "filestash")]
#[command(about = "FileStash - Quota-bounded local file storage")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file from disk
    Add {
        /// Path of the file to store
        path: PathBuf,
        /// MIME type (guessed from the extension if omitted)
        #[arg(short = 't', long = "type")]
        mime_type: Option<String>,
        /// Name to store the file under
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List stored files
    #[command(alias = "ls")]
    List,
    /// Show file details
    Show {
        /// File ID (full UUID or prefix)
        id: String,
    },
    /// Write a stored file back to disk
    Export {
        /// File ID (full UUID or prefix)
        id: String,
        /// Directory to write into (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Delete a stored file
    #[command(alias = "rm")]
    Delete {
        /// File ID (full UUID or prefix)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete all stored files (settings are kept)
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage usage
    Status,
    /// Show or change admission settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set a settings value
    Set {
        /// Settings key (max_file_size, allowed_types, compression_quality)
        key: String,
        /// Settings value
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, capacity_bytes, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config);

    // One store handle for the whole process
    let store = FileStore::open(&config);
    let manager = FileManager::new(store.clone());

    match cli.command {
        Commands::Add {
            path,
            mime_type,
            name,
        } => commands::file::add(&manager, path, mime_type, name, &output).await,
        Commands::List => commands::file::list(&manager, &output),
        Commands::Show { id } => commands::file::show(&store, id, &output),
        Commands::Export { id, out } => commands::file::export(&manager, id, out, &output),
        Commands::Delete { id, yes } => commands::file::delete(&manager, id, yes, &output),
        Commands::Clear { yes } => commands::file::clear(&manager, yes, &output),
        Commands::Status => commands::status::show(&manager, &config, &output),
        Commands::Settings { command } => handle_settings_command(command, &store, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_settings_command(
    command: Option<SettingsCommands>,
    store: &FileStore,
    output: &Output,
) -> Result<()> {
    match command {
        Some(SettingsCommands::Show) | None => commands::settings::show(store, output),
        Some(SettingsCommands::Set { key, value }) => {
            commands::settings::set(store, key, value, output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
