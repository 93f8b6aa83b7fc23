// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for the authenticated caller.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ProfileUpdate, Role};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Profile routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile/complete", post(complete_profile))
}

// ─── Current User ────────────────────────────────────────────

/// Caller's own profile.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub name: String,
    pub school_name: String,
    pub grade_class: String,
    /// False until a role has been stored.
    pub profile_complete: bool,
}

/// Get current user profile.
async fn get_me(Extension(user): Extension<AuthUser>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        profile_complete: user.role_present,
        id: user.id,
        email: user.email,
        role: user.role,
        name: user.name,
        school_name: user.school_name,
        grade_class: user.grade_class,
    })
}

// ─── Profile Completion ──────────────────────────────────────

/// Every field defaults so that a caller who already has a role always gets
/// a conflict, whatever the payload.
#[derive(Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase", default)]
struct CompleteProfileRequest {
    #[validate(custom(function = "validate_role"))]
    role: String,
    #[validate(custom(function = "validate_not_blank"))]
    name: String,
    #[validate(custom(function = "validate_not_blank"))]
    school_name: String,
    grade_class: Option<String>,
}

fn validate_role(value: &str) -> std::result::Result<(), ValidationError> {
    match Role::parse(value.trim()) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("role")),
    }
}

fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompleteProfileResponse {
    pub ok: bool,
    pub profile: ProfileResponse,
}

/// Set role, name, school and class once, right after signup.
async fn complete_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<CompleteProfileRequest>, JsonRejection>,
) -> Result<Json<CompleteProfileResponse>> {
    if user.role_present {
        tracing::warn!(
            user_id = %user.id,
            role = ?user.role,
            "Profile completion attempted with role already set"
        );
        return Err(AppError::Conflict("Profile is already complete".to_string()));
    }

    let Json(request) = body?;
    request.validate()?;

    let role = Role::parse(request.role.trim())
        .ok_or_else(|| AppError::BadRequest("Invalid fields: role".to_string()))?;

    let update = ProfileUpdate {
        role,
        name: request.name.trim().to_string(),
        school_name: request.school_name.trim().to_string(),
        grade_class: request
            .grade_class
            .map(|g| g.trim().to_string())
            .unwrap_or_default(),
    };

    state.admin.update_metadata(&user.id, &update).await?;

    tracing::info!(
        user_id = %user.id,
        role = role.as_str(),
        school = %update.school_name,
        "Profile completed"
    );

    Ok(Json(CompleteProfileResponse {
        ok: true,
        profile: ProfileResponse {
            id: user.id,
            email: user.email,
            role: Some(update.role),
            name: update.name,
            school_name: update.school_name,
            grade_class: update.grade_class,
            profile_complete: true,
        },
    }))
}
