//! packrat CLI - Command line interface for a packrat blob store
//!
//! Thin wrapper over [`BlobStore`] for inspecting and scripting store files.
//! Every command prints one JSON object.

use anyhow::Context;
use clap::{Parser, Subcommand};
use packrat::{BlobStore, StoreConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packrat")]
#[command(about = "A persistent store of binary blobs keyed by name")]
#[command(version)]
struct Cli {
    /// Path to the database file
    #[arg(short, long, default_value = "packrat.db")]
    database: PathBuf,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// JSON file with store settings (journal_mode, synchronous, busy_timeout_ms)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log more (repeat for more detail); RUST_LOG overrides when unset
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and schema
    Init,

    /// Store a payload under a key, replacing any existing one
    Set {
        /// The key
        key: String,
        /// Payload given inline (UTF-8 text, or hex with --hex)
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        value: Option<String>,
        /// Read the payload from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Interpret the inline value as hex
        #[arg(long)]
        hex: bool,
    },

    /// Fetch the payload stored under a key
    Get {
        /// The key
        key: String,
        /// Write the raw payload to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove a key
    Delete {
        /// The key
        key: String,
    },

    /// Check whether a key exists
    Exists {
        /// The key
        key: String,
    },

    /// List all keys in order
    List {
        /// Maximum number of keys to return
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Count stored entries
    Count,

    /// Show database status
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Init => {
            let store = open_store(&cli)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "message": format!("Initialized store at {}", store.path().display())
                }),
            )?;
        }

        Commands::Set {
            key,
            value,
            file,
            hex: as_hex,
        } => {
            let payload = match (value, file) {
                (_, Some(file)) => std::fs::read(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?,
                (Some(value), None) if *as_hex => {
                    hex::decode(value).context("Value is not valid hex")?
                }
                (Some(value), None) => value.clone().into_bytes(),
                (None, None) => anyhow::bail!("No payload given"),
            };

            let store = open_store(&cli)?;
            if store.set(key, &payload)? {
                output(
                    &cli.format,
                    &serde_json::json!({
                        "status": "ok",
                        "key": key,
                        "size": payload.len()
                    }),
                )?;
            } else {
                output(
                    &cli.format,
                    &serde_json::json!({
                        "status": "error",
                        "message": "Key and payload must both be non-empty"
                    }),
                )?;
                std::process::exit(1);
            }
        }

        Commands::Get { key, output: out } => {
            let store = open_store(&cli)?;
            match store.get(key)? {
                Some(bytes) => {
                    if let Some(out) = out {
                        std::fs::write(out, &bytes)
                            .with_context(|| format!("Failed to write {}", out.display()))?;
                        output(
                            &cli.format,
                            &serde_json::json!({
                                "status": "ok",
                                "key": key,
                                "size": bytes.len(),
                                "written_to": out.display().to_string()
                            }),
                        )?;
                    } else {
                        output(
                            &cli.format,
                            &serde_json::json!({
                                "key": key,
                                "size": bytes.len(),
                                "hex": hex::encode(&bytes),
                                "text": std::str::from_utf8(&bytes).ok()
                            }),
                        )?;
                    }
                }
                None => {
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "status": "error",
                            "message": format!("Key not found: {}", key)
                        }),
                    )?;
                    std::process::exit(1);
                }
            }
        }

        Commands::Delete { key } => {
            let store = open_store(&cli)?;
            let removed = store.delete(key)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "key": key,
                    "removed": removed
                }),
            )?;
        }

        Commands::Exists { key } => {
            let store = open_store(&cli)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "key": key,
                    "exists": store.data_exists(key)?
                }),
            )?;
        }

        Commands::List { limit } => {
            let store = open_store(&cli)?;
            let mut keys = store.list()?;
            if let Some(limit) = limit {
                keys.truncate(*limit);
            }
            output(
                &cli.format,
                &serde_json::json!({
                    "count": keys.len(),
                    "keys": keys
                }),
            )?;
        }

        Commands::Count => {
            let store = open_store(&cli)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "count": store.num_entries()?
                }),
            )?;
        }

        Commands::Status => {
            let store = open_store(&cli)?;
            let entries = store.num_entries()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "database": store.path().display().to_string(),
                    "entries": entries,
                    "file_size": file_size(store.path()),
                    "journal_mode": store.config().journal_mode,
                    "synchronous": store.config().synchronous
                }),
            )?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(cli: &Cli) -> anyhow::Result<BlobStore> {
    let config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::default(),
    };
    let store = BlobStore::open_with_config(&cli.database, config)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    Ok(store)
}

fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

fn output(format: &OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
