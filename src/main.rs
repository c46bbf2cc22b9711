//! Dungeon Exchange Engine - Backend API for random encounter tables
//!
//! The Engine is the backend server that:
//! - Builds encounter tables from the monster catalog
//! - Rolls on stored tables with OS-backed randomness
//! - Shares published tables through short public slugs

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dungeon_exchange=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dungeon Exchange Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Database: {}", config.database_url);
    tracing::info!("  Admins: {}", config.admin_user_ids.len());
    if let Some(ref path) = config.monster_seed_path {
        tracing::info!("  Monster seed: {}", path);
    }
    let port = config.server_port;

    // Initialize application state
    let state = Arc::new(AppState::new(config).await?);
    tracing::info!("Application state initialized");

    let app = http::build_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
