// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Development-only environment diagnostics.
//!
//! Reports which settings are present and whether the external services
//! answer. Configured values are never included in the response.

use crate::error::{AppError, Result};
use crate::services::ProbeStatus;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dev/env-check", get(env_check))
}

#[derive(Serialize)]
pub struct Probes {
    pub supabase: ProbeStatus,
    pub gemini: ProbeStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvCheckResponse {
    /// `configured` or `empty` per allow-listed key
    pub env: BTreeMap<&'static str, &'static str>,
    /// Number of Gemini keys available for rotation (informational)
    pub gemini_key_count: usize,
    pub probes: Probes,
}

/// Report configuration presence and probe external services.
async fn env_check(State(state): State<Arc<AppState>>) -> Result<Json<EnvCheckResponse>> {
    if !state.config.is_development() {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let env = state
        .config
        .configured_keys()
        .into_iter()
        .map(|(key, set)| (key, if set { "configured" } else { "empty" }))
        .collect();

    let supabase = if state.config.supabase_anon_key.is_empty() {
        ProbeStatus::Skip
    } else {
        ProbeStatus::from_result("supabase", state.identity.health().await)
    };

    let gemini = state
        .gemini
        .probe(state.config.gemini_api_keys.first().map(String::as_str))
        .await;

    tracing::info!(?supabase, ?gemini, "Environment check completed");

    Ok(Json(EnvCheckResponse {
        env,
        gemini_key_count: state.config.gemini_api_keys.len(),
        probes: Probes { supabase, gemini },
    }))
}
