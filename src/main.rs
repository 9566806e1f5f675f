// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride-Dispatch API Server
//!
//! Prices trips, matches ride requests to nearby drivers and runs each
//! ride through its lifecycle.

use ride_dispatch::{config::Config, AppState, Collaborators};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Ride-Dispatch API");

    let collaborators = Collaborators::from_config(&config)?;
    match &config.routing_url {
        Some(url) => tracing::info!(url = %url, "Using OSRM routing"),
        None => tracing::warn!("ROUTING_URL not set, using straight-line routing"),
    }

    // Build shared state
    let state = Arc::new(AppState::build(config.clone(), collaborators)?);
    let pricing = state.pricing.current()?;
    tracing::info!(
        version = pricing.version,
        currency = %pricing.currency,
        "Pricing config loaded"
    );

    // Expire unmatched rides, promote scheduled ones, retry settlements
    let sweeper = state.sweeper().spawn(config.sweep_interval);
    tracing::info!(interval_secs = config.sweep_interval.as_secs(), "Ride sweeper started");

    // Build router
    let app = ride_dispatch::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    sweeper.abort();
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
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ride_dispatch=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
