// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase client tests against a local fake of the REST endpoints.
//!
//! These tests verify that:
//! 1. Caller tokens are resolved with the public key and rejected tokens map to `None`
//! 2. Admin calls carry the service-role key and the expected paths and queries
//! 3. Table reads and upserts use PostgREST filters and headers
//! 4. Non-success answers surface as upstream errors

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use school_admin::db::{IdentityAdmin, IdentityProvider, SchoolStore, SupabaseAdmin, SupabaseAuth};
use school_admin::error::AppError;
use school_admin::models::{ProfileUpdate, Role, UserPoints};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<Value>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn provider_user(id: &str, metadata: Value) -> Value {
    json!({
        "id": id,
        "email": format!("{id}@school.example"),
        "created_at": "2025-03-01T09:00:00Z",
        "user_metadata": metadata,
    })
}

#[tokio::test]
async fn test_token_lookup() {
    let router = Router::new()
        .route(
            "/auth/v1/user",
            get(|headers: HeaderMap| async move {
                if header(&headers, "apikey") != "anon" {
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
                match header(&headers, "authorization") {
                    "Bearer good" => Json(provider_user(
                        "u1",
                        json!({"role": ["admin"], "schoolName": "Oak Elementary", "name": 7}),
                    ))
                    .into_response(),
                    _ => StatusCode::UNAUTHORIZED.into_response(),
                }
            }),
        )
        .route("/auth/v1/health", get(|| async { StatusCode::OK }));
    let base_url = serve(router).await;
    let auth = SupabaseAuth::new(&base_url, "anon").unwrap();

    let identity = auth.user_for_token("good").await.unwrap().unwrap();
    assert_eq!(identity.id, "u1");
    assert_eq!(identity.email.as_deref(), Some("u1@school.example"));
    assert_eq!(identity.metadata.role, Some(Role::Admin));
    assert_eq!(identity.metadata.school_name, "Oak Elementary");
    assert_eq!(identity.metadata.name, "");

    assert!(auth.user_for_token("expired").await.unwrap().is_none());
    assert!(auth.health().await.is_ok());
}

#[tokio::test]
async fn test_admin_user_calls() {
    let log = Log::default();
    let updates = log.clone();

    let router = Router::new()
        .route(
            "/auth/v1/admin/users",
            get(
                |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                    let authorized = header(&headers, "apikey") == "service"
                        && header(&headers, "authorization") == "Bearer service";
                    let first_page = query.get("page").map(String::as_str) == Some("1")
                        && query.get("per_page").map(String::as_str) == Some("1000");
                    if !authorized || !first_page {
                        return StatusCode::BAD_GATEWAY.into_response();
                    }
                    Json(json!({
                        "users": [
                            provider_user("u1", json!({"role": "teacher"})),
                            provider_user("u2", json!(null)),
                        ],
                        "aud": "authenticated",
                    }))
                    .into_response()
                },
            ),
        )
        .route(
            "/auth/v1/admin/users/{id}",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "u1" => Json(provider_user("u1", json!({"role": "teacher"}))).into_response(),
                    _ => StatusCode::NOT_FOUND.into_response(),
                }
            })
            .put(move |Path(id): Path<String>, Json(body): Json<Value>| {
                let updates = updates.clone();
                async move {
                    updates.lock().unwrap().push(json!({"id": id, "body": body}));
                    Json(json!({}))
                }
            }),
        );
    let base_url = serve(router).await;
    let admin = SupabaseAdmin::new(&base_url, "service").unwrap();

    let users = admin.list_users(1, 1000).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].metadata.role, Some(Role::Teacher));
    assert_eq!(users[1].metadata.role, None);

    assert!(admin.get_user("u1").await.unwrap().is_some());
    assert!(admin.get_user("no such user").await.unwrap().is_none());

    admin
        .update_metadata(
            "u1",
            &ProfileUpdate {
                role: Role::Teacher,
                name: "Lee".to_string(),
                school_name: "Oak Elementary".to_string(),
                grade_class: "3-2".to_string(),
            },
        )
        .await
        .unwrap();
    admin.set_password("u1", "123456").await.unwrap();

    let recorded = log.lock().unwrap().clone();
    assert_eq!(
        recorded,
        vec![
            json!({"id": "u1", "body": {"user_metadata": {
                "role": "teacher",
                "name": "Lee",
                "schoolName": "Oak Elementary",
                "gradeClass": "3-2",
            }}}),
            json!({"id": "u1", "body": {"password": "123456"}}),
        ]
    );
}

#[tokio::test]
async fn test_table_calls() {
    let log = Log::default();
    let upserts = log.clone();

    let router = Router::new()
        .route(
            "/rest/v1/school_settings",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                if query.get("school_name").map(String::as_str) == Some("eq.Oak Elementary") {
                    Json(json!([{
                        "school_name": "Oak Elementary",
                        "settings": "{\"diagnosisTitle\":\"Check-in\"}",
                    }]))
                } else {
                    Json(json!([]))
                }
            }),
        )
        .route(
            "/rest/v1/user_points",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                if query.get("user_email").map(String::as_str) == Some("eq.t1@school.example") {
                    Json(json!([{
                        "user_email": "t1@school.example",
                        "base_points": 100,
                        "updated_at": "2025-03-01T09:00:00.000Z",
                    }]))
                } else {
                    Json(json!([]))
                }
            })
            .post(
                move |Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      Json(body): Json<Value>| {
                    let upserts = upserts.clone();
                    async move {
                        upserts.lock().unwrap().push(json!({
                            "on_conflict": query.get("on_conflict"),
                            "prefer": header(&headers, "prefer"),
                            "body": body,
                        }));
                        StatusCode::CREATED
                    }
                },
            ),
        );
    let base_url = serve(router).await;
    let store = SupabaseAdmin::new(&base_url, "service").unwrap();

    let row = store.get_settings_row("Oak Elementary").await.unwrap().unwrap();
    assert_eq!(row.school_name, "Oak Elementary");
    assert!(row.settings.is_string());
    assert!(store.get_settings_row("Maple Middle").await.unwrap().is_none());

    let points = store.get_points("t1@school.example").await.unwrap().unwrap();
    assert_eq!(points.base_points, 100);
    assert_eq!(points.login_points, 0);
    assert!(store.get_points("t2@school.example").await.unwrap().is_none());

    store
        .upsert_points(&UserPoints::initial("t1@school.example", "2025-03-02T00:00:00.000Z"))
        .await
        .unwrap();

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0]["on_conflict"], "user_email");
    assert_eq!(
        recorded[0]["prefer"],
        "resolution=merge-duplicates,return=minimal"
    );
    assert_eq!(recorded[0]["body"][0]["user_email"], "t1@school.example");
    assert_eq!(recorded[0]["body"][0]["base_points"], 100);
}

#[tokio::test]
async fn test_error_status_is_upstream() {
    let router = Router::new().route(
        "/rest/v1/user_points",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "relation does not exist") }),
    );
    let base_url = serve(router).await;
    let store = SupabaseAdmin::new(&base_url, "service").unwrap();

    match store.get_points("t1@school.example").await {
        Err(AppError::Upstream(msg)) => assert!(msg.contains("500")),
        other => panic!("expected upstream error, got {other:?}"),
    }
}
