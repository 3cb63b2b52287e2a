//! # Zuba House Shipping API Server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ZUBA_CONFIG / default path ──► ShippingConfig (TOML + ZUBA_* env)     │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                              RateResolver::from_config                  │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                    axum::serve (graceful on Ctrl+C / SIGTERM)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zuba_shipping::{RateResolver, ShippingConfig};
use zuba_shipping_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Zuba House shipping API...");

    let config_path = std::env::var_os("ZUBA_CONFIG").map(PathBuf::from);
    let config = ShippingConfig::load(config_path).context("Invalid shipping configuration")?;
    info!(
        bind = %config.server.bind_address(),
        carrier_configured = config.carrier.is_configured(),
        currency = %config.fallback.currency,
        "Configuration loaded"
    );

    let resolver = RateResolver::from_config(&config)?;
    let app = router(Arc::new(AppState::new(resolver)));

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, "Shipping API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zuba=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
