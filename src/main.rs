// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! School-admin API Server
//!
//! Authorizes teachers and admins against the hosted Supabase project and
//! serves per-school settings to the frontend.

use school_admin::{
    config::Config,
    db::{SupabaseAdmin, SupabaseAuth},
    services::GeminiClient,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        app_env = ?config.app_env,
        gemini_keys = config.gemini_api_keys.len(),
        "Starting school-admin API"
    );

    // Caller-tier and privileged clients are separate handles
    let identity = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        &config.supabase_anon_key,
    )?);
    let privileged = Arc::new(SupabaseAdmin::new(
        &config.supabase_url,
        &config.supabase_service_role_key,
    )?);
    tracing::info!(url = %config.supabase_url, "Supabase clients initialized");

    let gemini = GeminiClient::new(&config.gemini_model);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        identity,
        admin: privileged.clone(),
        store: privileged,
        gemini,
    });

    // Build router
    let app = school_admin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("school_admin=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
