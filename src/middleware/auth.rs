// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.
//!
//! Resolves the caller's account from the hosted auth provider on every
//! request. Nothing is cached between requests.

use crate::db::IdentityProvider;
use crate::error::{AppError, Result};
use crate::models::identity::same_school;
use crate::models::{Identity, Role};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated caller, resolved per request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Set when any role value is stored, even one that is not recognized.
    pub role_present: bool,
    pub school_name: String,
    pub name: String,
    pub grade_class: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            role: identity.metadata.role,
            role_present: identity.metadata.role_present,
            school_name: identity.metadata.school_name,
            name: identity.metadata.name,
            grade_class: identity.metadata.grade_class,
        }
    }
}

impl AuthUser {
    /// Trimmed school name (may be empty).
    pub fn school(&self) -> &str {
        self.school_name.trim()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Require the admin role.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Require the admin role and a school to act within; returns the school.
    pub fn require_school_admin(&self) -> Result<&str> {
        self.require_admin()?;
        match self.school() {
            "" => Err(AppError::Forbidden(
                "Admin account has no school assigned".to_string(),
            )),
            school => Ok(school),
        }
    }

    /// Require a teacher or admin.
    pub fn require_staff(&self) -> Result<()> {
        match self.role {
            Some(Role::Teacher) | Some(Role::Admin) => Ok(()),
            None => Err(AppError::Forbidden(
                "Teacher or admin role required".to_string(),
            )),
        }
    }

    /// Whether `other_school` is the caller's school.
    pub fn same_school_as(&self, other_school: &str) -> bool {
        same_school(&self.school_name, other_school)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Result<&str> {
    let value = auth_header
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    // Auth schemes are case-insensitive (RFC 7235).
    let (scheme, token) = value.split_once(' ').ok_or(AppError::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AppError::Unauthorized);
    }
    let token = token.trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(token)
}

/// Resolve the caller behind an Authorization header.
///
/// Headers that are missing, not `Bearer`, or do not carry a structurally
/// valid JWT are rejected without contacting the provider.
pub async fn resolve(
    identity: &dyn IdentityProvider,
    auth_header: Option<&HeaderValue>,
) -> Result<AuthUser> {
    let token = extract_bearer_token(auth_header)?;

    jsonwebtoken::decode_header(token).map_err(|_| AppError::InvalidToken)?;

    let user = identity
        .user_for_token(token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    tracing::debug!(user_id = %user.id, role = ?user.metadata.role, "Resolved caller");
    Ok(user.into())
}

/// Middleware that requires a valid bearer token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = request.headers().get(header::AUTHORIZATION).cloned();
    let auth_user = resolve(state.identity.as_ref(), auth_header.as_ref()).await?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
