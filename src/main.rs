// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trading Hub API Server
//!
//! Serves the item catalog, trade-ad board and chat, and completes
//! Roblox OAuth sign-ins.

use std::sync::Arc;
use trading_hub::{config::Config, db, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage_backend,
        "Starting Trading Hub API"
    );

    // Storage is selected once here and injected everywhere else
    let storage = db::connect(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), storage)?);

    // Build router
    let app = trading_hub::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trading_hub=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
