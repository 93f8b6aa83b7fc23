// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pre-authentication routes used during signup.

use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/verify-admin-code", post(verify_admin_code))
}

#[derive(Deserialize)]
struct VerifyCodeRequest {
    code: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VerifyCodeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Exact comparison against the configured secret.
///
/// The secret is trimmed when configuration loads; the submitted code is not,
/// so `" pbk "` does not match `"pbk"`.
pub fn invite_code_matches(submitted: &str, secret: &str) -> bool {
    !secret.is_empty() && bool::from(submitted.as_bytes().ct_eq(secret.as_bytes()))
}

/// Check an admin invitation code. No rate limiting or lockout.
async fn verify_admin_code(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VerifyCodeResponse>)> {
    let Json(request) = body?;

    if invite_code_matches(&request.code, &state.config.admin_invite_code) {
        tracing::info!("Admin invitation code accepted");
        return Ok((
            StatusCode::OK,
            Json(VerifyCodeResponse {
                ok: true,
                error: None,
            }),
        ));
    }

    tracing::warn!("Admin invitation code rejected");
    Ok((
        StatusCode::UNAUTHORIZED,
        Json(VerifyCodeResponse {
            ok: false,
            error: Some("Invalid invitation code".to_string()),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_exact_match() {
        assert!(invite_code_matches("pbk", "pbk"));
        assert!(!invite_code_matches("PBK", "pbk"));
        assert!(!invite_code_matches(" pbk ", "pbk"));
        assert!(!invite_code_matches("pb", "pbk"));
        assert!(!invite_code_matches("", ""));
    }
}
