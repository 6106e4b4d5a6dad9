// Main entry point - Dependency injection and session startup
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sensor_telemetry::application::session::TelemetrySession;
use sensor_telemetry::infrastructure::config::load_telemetry_config;
use sensor_telemetry::infrastructure::history_client::HttpHistoryClient;
use sensor_telemetry::infrastructure::ws_connection::ConnectionManager;
use sensor_telemetry::presentation::console::{run_controls, run_dashboard, spawn_stdin_reader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_telemetry_config()?;
    let settings = config.telemetry;

    // Create adapters (infrastructure layer)
    let history = Arc::new(HttpHistoryClient::new(settings.history_url.clone()));
    let manager = ConnectionManager::new(settings.stream_url.clone());

    // Create session (application layer)
    let session = TelemetrySession::new(manager, history, settings.history_limit);
    let snapshots = session.subscribe();
    let (command_tx, command_rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    // Start display and controls (presentation layer)
    let dashboard = tokio::spawn(run_dashboard(snapshots, shutdown.clone()));
    let controls = tokio::spawn(run_controls(
        spawn_stdin_reader(),
        command_tx,
        settings.speed_step,
        shutdown.clone(),
    ));

    println!(
        "Starting sensor-telemetry (stream {}, history {}, window {})",
        settings.stream_url,
        settings.history_url,
        settings.history_limit + 1
    );
    let session_task = tokio::spawn(session.run(command_rx, shutdown.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    shutdown.cancel();

    session_task.await?;
    dashboard.await?;
    // The stdin thread is detached and does not hold the runtime open.
    controls.await?;

    Ok(())
}
