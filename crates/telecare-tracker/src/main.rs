//! Telecare call session tracker
//!
//! Runs the call tracker standalone: either as a long-lived service that logs
//! a periodic summary of the call desk, or as a short simulation over the demo
//! calls.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use telecare_core::{CallHistoryEntry, LoggingConfig};
use telecare_tracker::{Result, TrackerConfig, TrackerError, TrackerService};
use tokio::signal;
use tracing::{info, warn};

/// Command line interface for the call session tracker
#[derive(Parser)]
#[command(
    name = "telecare-tracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Call session tracker for the telecare call desk",
    long_about = "Tracks active doctor-patient consult calls, keeps their elapsed time current and records concluded calls in a most-recent-first history."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Start the tracker service in the foreground
    Start,

    /// Validate or print configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration values
        #[arg(short, long)]
        validate: bool,
    },

    /// Run the demo calls for a while, then end them all and print history
    Simulate {
        /// How long to let the calls run
        #[arg(short, long, default_value = "3")]
        seconds: u64,
    },
}

/// Main entry point for the tracker
///
/// # Errors
///
/// Returns error if configuration, logging or the service fails
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = load_config(cli.config.as_deref()).await?;

    match cli.command {
        Some(Commands::Config { show, validate }) => handle_config_command(&config, show, validate),
        Some(Commands::Simulate { seconds }) => simulate(config, seconds).await,
        Some(Commands::Start) | None => start_service(config).await,
    }
}

/// Initialize logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let format = if cli.json {
        "json".to_string()
    } else {
        cli.log_format.clone()
    };
    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format,
    };

    telecare_core::init_logging(&logging)
        .map_err(|e| TrackerError::configuration(e.to_string()))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = cli.log_level,
        "Telecare tracker starting"
    );
    Ok(())
}

/// Load configuration from file or environment
///
/// # Errors
///
/// Returns error if the configuration file cannot be read or parsed
async fn load_config(config_path: Option<&std::path::Path>) -> Result<TrackerConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());

        let config_content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TrackerError::configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        TrackerConfig::from_toml_str(&config_content)
    } else {
        info!("Loading default configuration");
        TrackerConfig::load()
    }
}

/// Run the tracker service until Ctrl+C
///
/// # Errors
///
/// Returns error if the service cannot be created or started
async fn start_service(config: TrackerConfig) -> Result<()> {
    info!(
        service = %config.service.name,
        tick_interval_ms = config.tick.tick_interval_ms,
        seed_demo_data = config.fixtures.seed_demo_data,
        "Starting tracker service"
    );

    let service = TrackerService::new(config)?;
    service.start()?;
    info!("Tracker service is running. Press Ctrl+C to stop.");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
        () = service.wait_for_shutdown() => {
            info!("Service requested shutdown");
        }
    }

    service.stop().await?;

    let metrics = service.metrics();
    info!(
        sessions_created = metrics.sessions_created,
        sessions_ended = metrics.sessions_ended,
        ticks = metrics.ticks,
        "Service stopped successfully"
    );
    Ok(())
}

/// Run the demo calls for `seconds`, end them and print the history
///
/// # Errors
///
/// Returns error if the service cannot be created or a call cannot be ended
async fn simulate(mut config: TrackerConfig, seconds: u64) -> Result<()> {
    config.fixtures.seed_demo_data = true;
    config.service.summary_interval_seconds = 0;

    let service = TrackerService::new(config)?;
    service.start()?;
    info!(seconds, "Simulating call desk");

    tokio::time::sleep(Duration::from_secs(seconds)).await;

    service.tick_now();
    for id in service.active_ids() {
        if let Err(e) = service.end(id) {
            warn!(session_id = %id, error = %e, "Failed to end call");
        }
    }
    service.stop().await?;

    print_history(&service.list_history());
    Ok(())
}

/// Print history entries as a table
fn print_history(history: &[CallHistoryEntry]) {
    println!(
        "{:<24} {:<20} {:>8}  {:<20} {}",
        "DOCTOR", "PATIENT", "DURATION", "ENDED", "STATUS"
    );
    for entry in history {
        println!(
            "{:<24} {:<20} {:>8}  {:<20} {}",
            entry.doctor,
            entry.patient,
            entry.duration,
            entry.end_time.format("%Y-%m-%d %H:%M:%S"),
            entry.status.label()
        );
    }
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration is invalid or cannot be serialized
fn handle_config_command(config: &TrackerConfig, show: bool, validate: bool) -> Result<()> {
    if validate {
        info!("Validating configuration...");
        config.validate()?;
        info!("Configuration validation completed");
    }

    if show {
        let config_toml = toml::to_string_pretty(config).map_err(|e| {
            TrackerError::configuration(format!("Failed to serialize configuration: {e}"))
        })?;
        println!("{config_toml}");
    }

    Ok(())
}
