use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use vital_track_cli::repl::{parse_command, Repl};
use vital_track_data::storage::JsonFileStorage;
use vital_track_domain::services::{ReadingStore, UndoController, DEFAULT_UNDO_WINDOW};
use vital_track_domain::storage::ReadingStorage;

/// The main entry point for the VitalTrack journal
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Ensures the data directory exists
/// 4. Loads the journal from its JSON file
/// 5. Runs the interactive command loop
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging. Logs go to stderr so the
    // command loop keeps stdout to itself.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    info!("🚀 Starting the VitalTrack journal");

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    // Create the data directory if it doesn't exist
    if !PathBuf::from(&data_dir).exists() {
        info!("Creating data directory: {}", data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("could not create the data directory '{data_dir}'"))?;
    }

    let journal_path = PathBuf::from(&data_dir).join("readings.json");
    info!("Using the journal file at {}", journal_path.display());

    let window = undo_window()?;

    let storage = JsonFileStorage::new(journal_path);
    let store = Arc::new(Mutex::new(ReadingStore::load(storage).await));
    info!("Loaded {} readings", store.lock().await.len());

    let undo = UndoController::with_window(Arc::clone(&store), window);
    let repl = Repl::new(store, undo);

    run_loop(repl).await?;

    info!("Journal closed");
    Ok(())
}

/// Undo window from the environment, falling back to the default.
fn undo_window() -> anyhow::Result<Duration> {
    match std::env::var("UNDO_WINDOW_SECS") {
        Ok(raw) => {
            let secs = raw.parse::<u64>().with_context(|| {
                format!("UNDO_WINDOW_SECS must be a number of seconds, got '{raw}'")
            })?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(DEFAULT_UNDO_WINDOW),
    }
}

/// Reads stdin line by line and executes each command until the user quits,
/// stdin closes, or a shutdown signal arrives.
async fn run_loop<S: ReadingStorage>(repl: Repl<S>) -> anyhow::Result<()> {
    use std::io::Write;

    println!("VitalTrack journal. Type 'help' for the list of commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        print!("> ");
        std::io::stdout().flush().context("could not flush stdout")?;

        let line = tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => line.context("could not read from stdin")?,
        };
        let Some(line) = line else {
            // stdin closed
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(command) => {
                let (message, quit) = repl.execute(command).await;
                println!("{message}");
                if quit {
                    break;
                }
            }
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}

/// Sets up a signal handler for graceful shutdown
///
/// This function creates an async task that waits for either:
/// - CTRL+C signal
/// - SIGTERM (on Unix systems)
///
/// When either signal is received, the function returns and triggers
/// the graceful shutdown process.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down the journal...");
}
