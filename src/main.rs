//! Task tracker server
//!
//! A personal task tracker with a trash retention window: tasks can be
//! completed, soft-deleted into a 30-day trash, restored, or permanently
//! deleted, with a scheduled sweep purging expired trash entries.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use taskhold::config::Config;
use taskhold::db::Database;
use taskhold::ops;
use taskhold::web;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Task tracker server and CLI tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Port for the HTTP server (overrides config)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    log: String,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve,

    /// Run one retention sweep and print the outcome as JSON
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Load configuration and apply CLI overrides
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.database {
        config.server.db_path = db_path;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        Some(Command::Purge) => run_purge(&config),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Run the HTTP server.
async fn run_server(config: Config) -> Result<()> {
    config.ensure_db_dir()?;

    info!("Starting task tracker v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.server.db_path);
    info!("Identity header: {}", config.auth.identity_header);
    info!("Retention window: {} days", config.retention.days);
    if config.auth.cron_token.is_none() {
        info!("Cleanup endpoint is unauthenticated (no cron_token configured)");
    }

    let db = Database::open(&config.server.db_path)?;
    info!("Database initialized successfully");

    web::serve(Arc::new(db), Arc::new(config)).await
}

/// Run one retention sweep and report the outcome, for external schedulers
/// that invoke the binary instead of the HTTP endpoint.
fn run_purge(config: &Config) -> Result<()> {
    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path)?;

    match ops::purge_expired(&db, config.retention.days) {
        Ok(outcome) => {
            println!(
                "{}",
                serde_json::json!({ "success": true, "purged": outcome.purged })
            );
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Retention sweep failed");
            println!(
                "{}",
                serde_json::json!({ "success": false, "error": e.message })
            );
            std::process::exit(1);
        }
    }
}
