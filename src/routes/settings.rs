// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! School settings routes for teachers and admins.
//!
//! Every read is keyed by the caller's own school.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Category, DiagnosisDomain, SchoolSettings};
use crate::services::settings;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Settings routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/settings/categories", get(get_categories))
        .route("/api/settings/diagnosis-domains", get(get_diagnosis_domains))
        .route("/api/settings/diagnosis", get(get_diagnosis_settings))
}

/// Resolve the caller's school settings.
///
/// Callers without a school get the defaults without a store lookup.
async fn load_for_caller(state: &AppState, user: &AuthUser) -> Result<SchoolSettings> {
    user.require_staff()?;

    let school = user.school();
    if school.is_empty() {
        tracing::debug!(user_id = %user.id, "Caller has no school, using default settings");
        return Ok(SchoolSettings::default());
    }

    let row = state.store.get_settings_row(school).await?;
    Ok(settings::parse(row.as_ref()))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

async fn get_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CategoriesResponse>> {
    let settings = load_for_caller(&state, &user).await?;
    Ok(Json(CategoriesResponse {
        categories: settings.categories,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DiagnosisDomainsResponse {
    pub domains: Vec<DiagnosisDomain>,
}

async fn get_diagnosis_domains(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DiagnosisDomainsResponse>> {
    let settings = load_for_caller(&state, &user).await?;
    Ok(Json(DiagnosisDomainsResponse {
        domains: settings.diagnosis_domains.to_vec(),
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisSettingsResponse {
    pub diagnosis_domains: Vec<DiagnosisDomain>,
    pub diagnosis_title: String,
}

async fn get_diagnosis_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DiagnosisSettingsResponse>> {
    let settings = load_for_caller(&state, &user).await?;
    Ok(Json(DiagnosisSettingsResponse {
        diagnosis_domains: settings.diagnosis_domains.to_vec(),
        diagnosis_title: settings.diagnosis_title,
    }))
}
