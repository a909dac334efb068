// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Evently API Server
//!
//! Serves event management routes and keeps user records in sync with the
//! identity provider via signed webhooks.

use evently::{
    cache::PageCache,
    config::Config,
    db::Database,
    middleware::{RouteGuard, SessionVerifier},
    services::ClerkClient,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Evently API");

    if config.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SECRET is not set; webhook deliveries will be rejected");
    }

    // Connect to MongoDB
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database)
        .await
        .expect("Failed to connect to MongoDB");

    let session_verifier = SessionVerifier::from_rsa_pem(&config.clerk_jwt_key)
        .expect("Failed to load session verification key");

    let route_guard = RouteGuard::standard().expect("Invalid route guard patterns");

    let clerk = ClerkClient::new(
        config.clerk_api_url.clone(),
        config.clerk_secret_key.clone(),
    );
    tracing::info!(api = %config.clerk_api_url, "Clerk client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        clerk,
        session_verifier,
        route_guard,
        page_cache: Arc::new(PageCache::new()),
    });

    // Build router
    let app = evently::routes::create_router(state);

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

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("evently=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
