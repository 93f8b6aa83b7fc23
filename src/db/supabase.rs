// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase REST clients.
//!
//! Two clients with different credentials:
//! - [`SupabaseAuth`] holds the public key and only resolves caller tokens.
//! - [`SupabaseAdmin`] holds the service-role key and talks to the GoTrue
//!   admin API and PostgREST tables.

use crate::db::{tables, IdentityAdmin, IdentityProvider, SchoolStore};
use crate::error::AppError;
use crate::models::identity::ProviderUser;
use crate::models::{Identity, ProfileUpdate, SettingsRow, UserPoints};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn build_http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed building HTTP client: {}", e)))
}

/// Caller-tier client (public key).
#[derive(Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn user_for_token(&self, token: &str) -> Result<Option<Identity>, AppError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token lookup request failed: {}", e)))?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: ProviderUser = check_response_json(response).await?;
        Ok(Some(user.into()))
    }

    async fn health(&self) -> Result<(), AppError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/health", self.base_url))
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Health request failed: {}", e)))?;

        check_response(response).await
    }
}

/// Privileged client (service-role key). Never exposed to callers.
#[derive(Clone)]
pub struct SupabaseAdmin {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Deserialize)]
struct UserListResponse {
    #[serde(default)]
    users: Vec<ProviderUser>,
}

impl SupabaseAdmin {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn admin_user_url(&self, id: &str) -> String {
        format!(
            "{}/auth/v1/admin/users/{}",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach the service-role credentials to a request.
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn update_user(&self, id: &str, body: serde_json::Value) -> Result<(), AppError> {
        let response = self
            .authorized(self.http.put(self.admin_user_url(id)))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("User update request failed: {}", e)))?;

        check_response(response).await
    }
}

#[async_trait]
impl IdentityAdmin for SupabaseAdmin {
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<Identity>, AppError> {
        let response = self
            .authorized(
                self.http
                    .get(format!("{}/auth/v1/admin/users", self.base_url)),
            )
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("User list request failed: {}", e)))?;

        let list: UserListResponse = check_response_json(response).await?;
        Ok(list.users.into_iter().map(Identity::from).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<Identity>, AppError> {
        let response = self
            .authorized(self.http.get(self.admin_user_url(id)))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("User lookup request failed: {}", e)))?;

        // GoTrue answers 404 for unknown ids and 400/422 for ids that are not UUIDs.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            tracing::debug!(user_id = %id, status = %response.status(), "User not found");
            return Ok(None);
        }

        let user: ProviderUser = check_response_json(response).await?;
        Ok(Some(user.into()))
    }

    async fn update_metadata(&self, id: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        self.update_user(id, serde_json::json!({ "user_metadata": update }))
            .await
    }

    async fn set_password(&self, id: &str, password: &str) -> Result<(), AppError> {
        self.update_user(id, serde_json::json!({ "password": password }))
            .await
    }
}

#[async_trait]
impl SchoolStore for SupabaseAdmin {
    async fn get_settings_row(&self, school_name: &str) -> Result<Option<SettingsRow>, AppError> {
        let response = self
            .authorized(self.http.get(self.table_url(tables::SCHOOL_SETTINGS)))
            .query(&[
                ("select", "school_name,settings".to_string()),
                ("school_name", format!("eq.{}", school_name)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Settings request failed: {}", e)))?;

        let rows: Vec<SettingsRow> = check_response_json(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_points(&self, points: &UserPoints) -> Result<(), AppError> {
        let response = self
            .authorized(self.http.post(self.table_url(tables::USER_POINTS)))
            .query(&[("on_conflict", "user_email")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[points])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Points upsert request failed: {}", e)))?;

        check_response(response).await
    }

    async fn get_points(&self, user_email: &str) -> Result<Option<UserPoints>, AppError> {
        let response = self
            .authorized(self.http.get(self.table_url(tables::USER_POINTS)))
            .query(&[
                ("select", "*".to_string()),
                ("user_email", format!("eq.{}", user_email)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Points request failed: {}", e)))?;

        let rows: Vec<UserPoints> = check_response_json(response).await?;
        Ok(rows.into_iter().next())
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Upstream(format!("HTTP {}: {}", status, body)))
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
}
