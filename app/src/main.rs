// In app/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::{Engine, StreamEvent};
use notify::WebhookPublisher;
use std::path::PathBuf;
use std::sync::Arc;
use store::{MemoryStore, StateStore};

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A crypto trend-detection and alerting engine.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Processes one batch of stream records, then exits.
    Process {
        /// Path to the batch event JSON ("-" reads from stdin).
        #[arg(short, long)]
        input: PathBuf,

        /// Use a throwaway in-memory state store instead of Postgres.
        #[arg(long)]
        memory: bool,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command-line arguments.
    let cli = Cli::parse();

    tracing::info!("Starting Crosswatch application");

    match cli.command {
        Commands::Process { input, memory } => {
            handle_process(input, memory).await?;
        }
    }

    tracing::info!("Crosswatch application has finished successfully.");

    Ok(())
}

// --- "Process" Subcommand Logic ---

/// Handles one batch: wires the store and publisher together, feeds the
/// event to the engine, and reports the summary. The exit code is about
/// the batch having been attempted, not about per-record success; the
/// summary carries the per-record accounting.
async fn handle_process(input: PathBuf, memory: bool) -> Result<()> {
    // --- 1. Initialization ---
    let settings = app_config::load_settings()?;
    tracing::info!("Application settings loaded successfully.");

    let raw = if input.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(&input)?
    };
    let event: StreamEvent = serde_json::from_str(&raw)?;

    // --- 2. Component Instantiation ---
    let state_store: Arc<dyn StateStore> = if memory {
        tracing::warn!("Using an in-memory state store. Nothing will be persisted.");
        Arc::new(MemoryStore::new())
    } else {
        let store = store::connect(&settings.store.url).await?;
        tracing::info!("State store connection established and migrations are up-to-date.");
        Arc::new(store)
    };
    let publisher = Arc::new(WebhookPublisher::new(settings.notify.topic_url.clone()));

    // --- 3. Run the batch ---
    let engine = Engine::new(state_store, publisher);
    let summary = engine.process_event(&event).await;

    tracing::info!(
        records = summary.records,
        processed = summary.processed,
        alerts = summary.alerts_published,
        decode_failures = summary.decode_failures,
        store_failures = summary.store_failures,
        notify_failures = summary.notify_failures,
        "Batch finished."
    );

    Ok(())
}
