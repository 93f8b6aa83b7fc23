// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes: school-scoped account management.
//!
//! Account enumeration reads a single page of up to 1000 accounts. Schools in
//! a project with more accounts than that will undercount.

use crate::db::MAX_USERS_PER_PAGE;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::identity::same_school;
use crate::models::{Identity, Role, TeacherSummary};
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

/// Password every admin reset assigns. Shared and predictable.
pub const RESET_PASSWORD: &str = "123456";

/// Admin routes (require authentication; role checked per handler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/count", post(count_admins))
        .route("/api/admin/teachers", get(list_teachers))
        .route("/api/admin/reset-password", post(reset_password))
        .route("/api/admin/verify-teacher", post(verify_teacher))
}

/// First page of accounts from the provider.
async fn first_page(state: &AppState) -> Result<Vec<Identity>> {
    state.admin.list_users(1, MAX_USERS_PER_PAGE).await
}

fn has_role(identity: &Identity, role: Role) -> bool {
    identity.metadata.role == Some(role)
}

// ─── Admin Count ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountRequest {
    #[serde(default)]
    school_name: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AdminCountResponse {
    pub admin_count: usize,
}

/// Count admin accounts registered to a school.
async fn count_admins(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<CountRequest>, JsonRejection>,
) -> Result<Json<AdminCountResponse>> {
    user.require_admin()?;
    let Json(request) = body?;

    let school = request.school_name.trim();
    if school.is_empty() {
        return Err(AppError::BadRequest("schoolName is required".to_string()));
    }

    let admin_count = first_page(&state)
        .await?
        .iter()
        .filter(|u| has_role(u, Role::Admin) && same_school(&u.metadata.school_name, school))
        .count();

    tracing::debug!(school = %school, admin_count, "Counted school admins");

    Ok(Json(AdminCountResponse { admin_count }))
}

// ─── Teacher Listing ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeachersResponse {
    pub teachers: Vec<TeacherSummary>,
}

/// List teachers in the caller's school.
async fn list_teachers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TeachersResponse>> {
    let school = user.require_school_admin()?;

    let teachers: Vec<TeacherSummary> = first_page(&state)
        .await?
        .iter()
        .filter(|u| has_role(u, Role::Teacher) && same_school(&u.metadata.school_name, school))
        .map(TeacherSummary::from)
        .collect();

    tracing::debug!(school = %school, count = teachers.len(), "Listed teachers");

    Ok(Json(TeachersResponse { teachers }))
}

// ─── Password Reset ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    user_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetPasswordResponse {
    pub ok: bool,
    pub message: String,
}

/// Reset a same-school account's password to [`RESET_PASSWORD`].
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<ResetPasswordResponse>> {
    user.require_school_admin()?;
    let Json(request) = body?;

    let target_id = request.user_id.trim();
    if target_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }

    let target = state
        .admin
        .get_user(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.same_school_as(&target.metadata.school_name) {
        tracing::warn!(
            admin_id = %user.id,
            target_id = %target.id,
            "Password reset denied: target belongs to another school"
        );
        return Err(AppError::Forbidden(
            "User belongs to a different school".to_string(),
        ));
    }

    state.admin.set_password(&target.id, RESET_PASSWORD).await?;

    tracing::warn!(
        admin_id = %user.id,
        target_id = %target.id,
        "Password reset to shared default"
    );

    Ok(Json(ResetPasswordResponse {
        ok: true,
        message: format!("Password has been reset to {}.", RESET_PASSWORD),
    }))
}

// ─── Teacher Verification ────────────────────────────────────

#[derive(Deserialize)]
struct VerifyTeacherRequest {
    email: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTeacherResponse {
    pub email: String,
    pub name: String,
    pub school_name: String,
}

/// Confirm that an email belongs to a teacher in the caller's school.
async fn verify_teacher(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<VerifyTeacherRequest>, JsonRejection>,
) -> Result<Json<VerifyTeacherResponse>> {
    user.require_admin()?;
    let Json(request) = body?;

    let wanted = request.email.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()));
    }

    let teacher = first_page(&state)
        .await?
        .into_iter()
        .find(|u| {
            has_role(u, Role::Teacher)
                && u.email
                    .as_deref()
                    .is_some_and(|e| e.trim().to_lowercase() == wanted)
        })
        .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))?;

    if !user.same_school_as(&teacher.metadata.school_name) {
        return Err(AppError::Forbidden(
            "Teacher belongs to a different school".to_string(),
        ));
    }

    Ok(Json(VerifyTeacherResponse {
        email: teacher.email.unwrap_or_default(),
        name: teacher.metadata.name,
        school_name: teacher.metadata.school_name,
    }))
}
