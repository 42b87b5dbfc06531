//! Folio CLI - folio command

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_core::RevisionId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod config;
mod diff_utils;
mod util;

/// Folio - revision history for plain document files
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save new document content (from stdin or --file) and record a revision
    Save {
        /// Document path
        doc: PathBuf,
        /// Read the new content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Editor user name (default: editor.default_user)
        #[arg(long)]
        user: Option<String>,
        /// Editor address (default: editor.default_ip)
        #[arg(long)]
        ip: Option<String>,
        /// Note attached to the change-log entry
        #[arg(long)]
        note: Option<String>,
        /// Save time as unix seconds (default: now)
        #[arg(long)]
        at: Option<RevisionId>,
    },
    /// List the revisions of a document
    Log {
        /// Document path
        doc: PathBuf,
        /// Number of rows to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a document, optionally at a previous revision
    Show {
        /// Document path
        doc: PathBuf,
        /// Revision id, or '~' for the current text
        #[arg(long)]
        version: Option<String>,
        /// Print the text only, without annotations
        #[arg(long)]
        raw: bool,
    },
    /// Compare two revisions of a document
    Diff {
        /// Document path
        doc: PathBuf,
        /// First revision id, or '~' for the current text
        a: String,
        /// Second revision id, or '~' for the current text
        b: String,
        /// Number of context lines (default: 3)
        #[arg(short = 'U', long, default_value = "3")]
        context: usize,
    },
    /// Report versioned documents under a directory
    Status {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,
    },
    /// View or edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a configuration value
    Get {
        /// Key such as history.codec
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Key such as history.codec
        key: String,
        /// New value
        value: String,
    },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for `show --raw`
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Save {
            doc,
            file,
            user,
            ip,
            note,
            at,
        } => {
            let args = cmd::save::SaveArgs {
                doc,
                file,
                user,
                ip,
                note,
                at,
            };
            cmd::save::run(args).await
        }
        Commands::Log { doc, limit } => cmd::log::run(&doc, limit).await,
        Commands::Show { doc, version, raw } => cmd::show::run(&doc, version.as_deref(), raw).await,
        Commands::Diff { doc, a, b, context } => cmd::diff::run(&doc, &a, &b, context).await,
        Commands::Status { dir } => cmd::status::run(dir).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
        },
    }
}
