//! Chattingo Gateway
//!
//! Front door of the Chattingo chat backend. Every request passes a
//! stateless gate: health, login and WebSocket routes are open, everything
//! else needs a bearer token.

use std::sync::Arc;

use tokio::net::TcpListener;

mod api;
mod auth;
mod config;
mod error;
mod gate;
mod logging;

use crate::api::build_router;
use crate::auth::{JwtManager, UserStore};
use crate::config::Config;
use crate::gate::{GateConfig, GateState};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Issues tokens at login.
    pub jwt_manager: JwtManager,
    pub user_store: UserStore,
    /// Same gate configuration the middleware enforces, for reporting.
    pub gate: Arc<GateConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is expected in production
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init();

    tracing::info!("Starting Chattingo Gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config.validate().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        anyhow::anyhow!("{}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Configuration loaded"
    );

    let gate_config = GateConfig::from_settings(&config.gate).map_err(|e| {
        tracing::error!(error = %e, "Invalid gate configuration");
        anyhow::anyhow!("Gate configuration error: {}", e)
    })?;

    tracing::info!(
        public_paths = ?gate_config.routes.public_patterns(),
        session = ?gate_config.session,
        csrf = %gate_config.csrf.describe(),
        "Request gate configured"
    );

    let jwt_manager = JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.clone(),
        config.auth.token_duration_hours,
    );
    let user_store = UserStore::new(config.auth.users.clone());
    if user_store.is_empty() {
        tracing::warn!("No users configured - login will reject every attempt");
    } else {
        tracing::info!(users = user_store.len(), "User store loaded");
    }

    let gate = GateState::new(gate_config, Arc::new(jwt_manager.clone()));
    let state = AppState {
        jwt_manager,
        user_store,
        gate: gate.config.clone(),
    };

    let app = build_router(state, gate);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
