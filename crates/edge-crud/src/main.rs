//! edge-crud - Main entry point
//!
//! Serves the `tickets-posts` and `user` functions over HTTP:
//! - Loads configuration from the environment
//! - Connects the store once and shares it with every request
//! - Routes `/functions/v1/{function}` to the matching function

mod config;
mod functions;
mod router;
mod runtime;
mod services;

use anyhow::{Context as _, Result};
use edge_crud_sdk::Store;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::functions::{FunctionRegistry, TicketSchema};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub functions: FunctionRegistry,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,edge_crud=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting edge-crud");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded: {:?}", config);

    if config.ticket_schema == TicketSchema::Basic {
        tracing::warn!(
            "Ticket schema 'basic' in use: 'status' and 'email' are not required on the Name table, \
             which differs from the canonical schema"
        );
    }

    let store = services::create_store(&config).context("Failed to create store")?;

    let state = Arc::new(AppState {
        functions: FunctionRegistry::new(config.ticket_schema),
        store,
        config: config.clone(),
    });

    let app = router::create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Functions listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("edge-crud stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
