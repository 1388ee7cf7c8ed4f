//! # Mostrador API Server
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load config ─► init tracing ─► open pool + migrate ─► bind ─► serve    │
//! │                                                                │        │
//! │                                      SIGINT / SIGTERM ◄────────┘        │
//! │                                             │                           │
//! │                                             ▼                           │
//! │             stop accepting, finish in-flight requests (≤ timeout)       │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                          drain connection pool (≤ timeout)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::IntoFuture;

use anyhow::Context;
use mostrador_api::config::{LogFormat, LoggingConfig};
use mostrador_api::{AppConfig, AppState};
use mostrador_db::Database;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.logging);

    info!("Starting Mostrador API server...");
    info!(
        store = %config.store.name,
        database = %config.database.path,
        tax_rate_bps = config.sales.tax_rate_bps,
        price_source = ?config.sales.price_source,
        utc_offset_minutes = config.store.utc_offset_minutes,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let addr = config.server.bind_address();
    let shutdown_timeout = config.server.shutdown_timeout();
    let app = mostrador_api::router(AppState::new(db.clone(), config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, "HTTP server listening");

    // Stop accepting on a signal, then give in-flight requests a bounded
    // amount of time before giving up on them.
    let (signalled_tx, mut signalled_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(true);
        })
        .into_future();

    tokio::select! {
        result = server => result.context("HTTP server error")?,
        _ = async {
            let _ = signalled_rx.wait_for(|signalled| *signalled).await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "In-flight requests did not finish in time"
            );
        }
    }

    db.drain(shutdown_timeout).await;

    info!("Server shutdown complete");
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match logging.format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
