mod bootstrap;
mod health;
mod routes;
mod stream;
mod upstream;

use anyhow::Result;
use glidedesk_core::config::{AppConfig, LoadOptions};
use tracing::info;

fn init_logging(config: &AppConfig) {
    use glidedesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.runtime.clone(),
    )
    .await?;

    let api_address =
        format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&api_address).await?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %api_address,
        "glidedesk-server started"
    );

    let graceful_shutdown_secs = app.config.server.graceful_shutdown_secs;
    axum::serve(listener, routes::router(app.runtime))
        .with_graceful_shutdown(wait_for_shutdown(graceful_shutdown_secs))
        .await?;

    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "glidedesk-server stopped"
    );

    Ok(())
}

async fn wait_for_shutdown(graceful_shutdown_secs: u64) {
    let _ = tokio::signal::ctrl_c().await;
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        graceful_shutdown_secs,
        "shutdown signal received, draining in-flight requests"
    );
}
