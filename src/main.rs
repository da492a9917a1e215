// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge-Tracker API Server
//!
//! Serves weekly workout charts and leaderboards for the coach dashboard of
//! fitness challenges.

use challenge_tracker::{
    config::{Config, StoreBackend},
    db::{ChallengeStore, FirestoreDb, MemoryStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        utc_offset_hours = config.utc_offset_hours,
        strength_session_weight = config.strength_session_weight,
        "Starting Challenge-Tracker API"
    );

    // Initialize the store
    let store: Arc<dyn ChallengeStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using empty in-memory store (local development only)");
            Arc::new(MemoryStore::new())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store)?);

    // Build router
    let app = challenge_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("challenge_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
