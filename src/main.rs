// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Course Forge API Server
//!
//! Serves the admin authoring API and the learner progress API.

use course_forge::{
    config::Config,
    db::FirestoreDb,
    services::{AiService, GeminiClient, IdentityVerifier, ScraperClient},
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
    tracing::info!(port = config.port, "Starting Course Forge API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let identity = Arc::new(IdentityVerifier::new(&config)?);
    tracing::info!(project = %config.gcp_project_id, "Identity verifier initialized");

    let gemini = GeminiClient::from_config(&config)?;
    let ai = AiService::new(Arc::new(gemini), config.max_prompt_chars);
    tracing::info!(model = %config.ai_model, "AI client initialized");

    let scraper = ScraperClient::new(&config)?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        ai,
        scraper,
    });

    // Build router
    let app = course_forge::routes::create_router(state);

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
                .add_directive("course_forge=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
