//! fulfillment-server binary

use std::time::Duration;

use anyhow::Context;
use fulfillment_server::utils::logger;
use fulfillment_server::{AppState, Config, api};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    logger::init_logger(&config.log_level, config.log_dir.as_deref());

    tracing::info!("Starting fulfillment-server (env: {})", config.environment);

    let state = AppState::new(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize application state")?;

    // Periodic finalize-queue pruning (every 5 minutes)
    let finalizer = state.finalizer.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let pruned = finalizer.prune_finished();
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned finished finalize jobs");
            }
        }
    });

    let app = api::create_router(state.clone());

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;
    tracing::info!("fulfillment-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // Let accepted orders reach the database before exiting
    state.finalizer.drain().await;
    tracing::info!("fulfillment-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
