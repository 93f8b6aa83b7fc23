// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use school_admin::config::Config;
use school_admin::db::MemoryBackend;
use school_admin::models::identity::RawMetadata;
use school_admin::models::Identity;
use school_admin::routes::create_router;
use school_admin::services::GeminiClient;
use school_admin::AppState;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

/// Router plus handles for inspecting the in-memory backend.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub backend: Arc<MemoryBackend>,
}

/// Create a test app backed by the in-memory backend.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let backend = Arc::new(MemoryBackend::new());
    // Nothing listens on port 9; Gemini is only reached when a key is set.
    let gemini = GeminiClient::with_base_url("http://127.0.0.1:9", &config.gemini_model);

    let state = Arc::new(AppState {
        config,
        identity: backend.clone(),
        admin: backend.clone(),
        store: backend.clone(),
        gemini,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        backend,
    }
}

/// Create a structurally valid JWT. Only its shape matters; the backend
/// decides whether it belongs to an account.
#[allow(dead_code)]
pub fn create_test_jwt(sub: &str) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-signing-key"),
    )
    .unwrap()
}

/// Register an account and return a token for it.
#[allow(dead_code)]
pub fn add_user(backend: &MemoryBackend, id: &str, metadata: serde_json::Value) -> String {
    let raw: RawMetadata = serde_json::from_value(metadata).unwrap();
    backend.insert_user(Identity {
        id: id.to_string(),
        email: Some(format!("{id}@school.example")),
        created_at: Some("2025-03-01T09:00:00Z".to_string()),
        metadata: raw.into(),
    });

    let token = create_test_jwt(id);
    backend.issue_token(&token, id);
    token
}

/// Send a request and decode the JSON response body (Null when empty).
#[allow(dead_code)]
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
