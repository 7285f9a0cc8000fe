//! Sign-Bridge - gesture recording and recognition server
//!
//! Standalone server with the REST API the capture client talks to.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use sign_bridge::config::{print_env_help, ServerConfig};
use sign_bridge::gesture::{GestureStore, StartupOutcome};
use sign_bridge::{handlers, metrics, middleware, tracing_setup};

/// Upper bound on the final backup flush during shutdown
const GRACEFUL_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|a| a == "--help" || a == "-h") {
        print_env_help();
        return Ok(());
    }

    tracing_setup::init_tracing()?;

    metrics::register_metrics()?;
    info!("Metrics registered at /metrics");

    info!("Starting Sign-Bridge server...");

    let server_config = ServerConfig::from_env();
    server_config.log();

    let store = GestureStore::open(server_config.store_config())?;
    match store.startup_outcome() {
        StartupOutcome::Reused { records } => info!(records, "Reusing live collection"),
        StartupOutcome::DimensionReset { previous, current } => {
            info!(previous, current, "Collection reset for new vector size")
        }
        StartupOutcome::Replayed { restored, skipped } => {
            info!(restored, skipped, "Startup restore finished")
        }
    }
    let store = Arc::new(store);
    let store_for_shutdown = Arc::clone(&store);

    let max_concurrent = server_config.max_concurrent_requests;
    info!("Concurrency limiting enabled: max_concurrent={}", max_concurrent);

    let app = handlers::build_router(store)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(server_config.cors.to_layer());

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flushing gesture backup...");

    let flush = tokio::task::spawn_blocking(move || store_for_shutdown.close());
    match tokio::time::timeout(Duration::from_secs(GRACEFUL_SHUTDOWN_TIMEOUT_SECS), flush).await {
        Ok(Ok(true)) => info!("Server shutdown complete"),
        Ok(Ok(false)) => tracing::error!("Final backup failed; last successful export kept"),
        Ok(Err(e)) => tracing::error!("Backup flush task failed: {e}"),
        Err(_) => {
            tracing::error!(
                "Backup flush timed out after {}s, forcing exit",
                GRACEFUL_SHUTDOWN_TIMEOUT_SECS
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Handle graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
