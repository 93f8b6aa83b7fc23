// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points routes for the authenticated caller.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserPoints;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Points routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/points", get(get_points))
        .route("/api/points/init", post(init_points))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InitPointsResponse {
    pub ok: bool,
    pub points: PointsResponse,
}

/// Points as sent to the frontend. The stored row keeps its column names.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub user_email: String,
    pub base_points: i64,
    pub login_points: i64,
    pub last_login_date: Option<String>,
    pub login_points_that_day: i64,
    pub updated_at: String,
}

impl From<UserPoints> for PointsResponse {
    fn from(row: UserPoints) -> Self {
        Self {
            user_email: row.user_email,
            base_points: row.base_points,
            login_points: row.login_points,
            last_login_date: row.last_login_date,
            login_points_that_day: row.login_points_that_day,
            updated_at: row.updated_at,
        }
    }
}

fn caller_email(user: &AuthUser) -> Result<&str> {
    user.email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("Account has no email address".to_string()))
}

/// Initialize (or reset) the caller's points.
///
/// Every call overwrites the row: base points go back to 100 and login
/// counters to zero. Not a top-up.
async fn init_points(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<InitPointsResponse>> {
    let email = caller_email(&user)?;
    let points = UserPoints::initial(email, now_rfc3339());

    state.store.upsert_points(&points).await?;

    tracing::info!(user_id = %user.id, "Points initialized");

    Ok(Json(InitPointsResponse {
        ok: true,
        points: points.into(),
    }))
}

/// Get the caller's points record.
async fn get_points(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PointsResponse>> {
    let email = caller_email(&user)?;

    state
        .store
        .get_points(email)
        .await?
        .map(|row| Json(PointsResponse::from(row)))
        .ok_or_else(|| AppError::NotFound("Points have not been initialized".to_string()))
}
