// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! School settings route tests.

use axum::http::StatusCode;
use school_admin::models::settings::default_domains;
use serde_json::{json, Value};

mod common;

const SCHOOL: &str = "Oak Elementary";

fn defaults() -> Value {
    serde_json::to_value(default_domains()).unwrap()
}

fn domains(count: usize) -> Value {
    (0..count)
        .map(|i| json!({"name": format!("Domain {i}"), "items": [format!("Prompt {i}")]}))
        .collect()
}

fn teacher(app: &common::TestApp) -> String {
    common::add_user(
        &app.backend,
        "t1",
        json!({"role": "teacher", "schoolName": SCHOOL}),
    )
}

async fn diagnosis(app: &common::TestApp, token: &str) -> Value {
    let (status, body) =
        common::send(app, "GET", "/api/settings/diagnosis", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_no_row_returns_defaults() {
    let app = common::create_test_app();
    let token = teacher(&app);

    let body = diagnosis(&app, &token).await;
    assert_eq!(body["diagnosisDomains"], defaults());
    assert_eq!(body["diagnosisTitle"], "");

    let (status, body) =
        common::send(&app, "GET", "/api/settings/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"categories": []}));
}

#[tokio::test]
async fn test_invalid_blobs_fall_back_to_defaults() {
    for blob in [
        json!("{not json"),
        json!({"categories": [{"name": "Reading"}], "diagnosisDomains": domains(5)}),
        json!({"version": 7, "diagnosisDomains": domains(6)}),
        json!({"categories": [{"name": "Reading"}], "diagnosisTitle": "No domains"}),
        json!([1, 2, 3]),
    ] {
        let app = common::create_test_app();
        let token = teacher(&app);
        app.backend.set_settings(SCHOOL, blob.clone());

        let body = diagnosis(&app, &token).await;
        assert_eq!(body["diagnosisDomains"], defaults(), "{blob}");
        assert_eq!(body["diagnosisTitle"], "", "{blob}");

        let (_, body) =
            common::send(&app, "GET", "/api/settings/categories", Some(&token), None).await;
        assert_eq!(body["categories"], json!([]), "{blob}");
    }
}

#[tokio::test]
async fn test_stored_settings_returned() {
    let app = common::create_test_app();
    let token = teacher(&app);
    app.backend.set_settings(
        SCHOOL,
        json!({
            "version": 2,
            "categories": [{"id": "read", "name": "Reading", "unit": "books"}],
            "diagnosisDomains": domains(6),
            "diagnosisTitle": "Spring check-in",
        }),
    );

    let (status, body) =
        common::send(&app, "GET", "/api/settings/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["categories"],
        json!([{"id": "read", "name": "Reading", "unit": "books"}])
    );

    let (status, body) = common::send(
        &app,
        "GET",
        "/api/settings/diagnosis-domains",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domains"], domains(6));

    let body = diagnosis(&app, &token).await;
    assert_eq!(body["diagnosisTitle"], "Spring check-in");
}

#[tokio::test]
async fn test_settings_keyed_by_caller_school() {
    let app = common::create_test_app();
    let token = teacher(&app);
    app.backend.set_settings(
        "Maple Middle",
        json!({"categories": ["Reading"], "diagnosisTitle": "Maple only", "diagnosisDomains": domains(6)}),
    );

    let body = diagnosis(&app, &token).await;
    assert_eq!(body["diagnosisTitle"], "");
}

#[tokio::test]
async fn test_legacy_category_names() {
    let app = common::create_test_app();
    let token = teacher(&app);
    app.backend.set_settings(
        SCHOOL,
        json!({"categories": ["Reading", "Kindness"], "diagnosisDomains": domains(6)}),
    );

    let (_, body) =
        common::send(&app, "GET", "/api/settings/categories", Some(&token), None).await;
    assert_eq!(
        body["categories"],
        json!([
            {"id": "Reading", "name": "Reading", "unit": ""},
            {"id": "Kindness", "name": "Kindness", "unit": ""},
        ])
    );
}

#[tokio::test]
async fn test_caller_without_school_gets_defaults() {
    let app = common::create_test_app();
    let token = common::add_user(&app.backend, "a1", json!({"role": "admin", "schoolName": "  "}));
    // Would be returned if a blank school name were ever looked up.
    app.backend
        .set_settings("", json!({"diagnosisTitle": "unscoped", "diagnosisDomains": domains(6)}));
    app.backend
        .set_settings("  ", json!({"diagnosisTitle": "unscoped", "diagnosisDomains": domains(6)}));

    let body = diagnosis(&app, &token).await;
    assert_eq!(body["diagnosisDomains"], defaults());
    assert_eq!(body["diagnosisTitle"], "");
}

#[tokio::test]
async fn test_settings_require_role() {
    let app = common::create_test_app();
    let token = common::add_user(&app.backend, "u1", json!({"schoolName": SCHOOL}));

    for uri in [
        "/api/settings/categories",
        "/api/settings/diagnosis-domains",
        "/api/settings/diagnosis",
    ] {
        let (status, body) = common::send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "forbidden");
    }
}

#[tokio::test]
async fn test_store_outage_is_upstream_error() {
    let app = common::create_test_app();
    let token = teacher(&app);
    app.backend.set_offline(true);

    let (status, body) =
        common::send(&app, "GET", "/api/settings/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream_error");
}
