// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client, used only to confirm the provider is reachable.

use crate::error::AppError;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Fail,
    /// No credential configured, nothing attempted.
    Skip,
}

impl ProbeStatus {
    /// Map a probe result, logging the failure detail server-side only.
    pub fn from_result(target: &str, result: Result<(), AppError>) -> Self {
        match result {
            Ok(()) => ProbeStatus::Ok,
            Err(e) => {
                tracing::warn!(target_service = target, error = %e, "Connectivity probe failed");
                ProbeStatus::Fail
            }
        }
    }
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(model: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, model)
    }

    pub fn with_base_url(base_url: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Send a minimal generation request with a trivial prompt.
    pub async fn generate_ping(&self, api_key: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": "ping" }] }],
            "generationConfig": { "maxOutputTokens": 1 }
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .timeout(PROBE_TIMEOUT)
            .json(&body)
            .send()
            .await
            // The URL carries the key; keep it out of the error text.
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {}", e.without_url())))?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(AppError::Upstream(format!(
            "Gemini returned HTTP {}",
            response.status()
        )))
    }

    /// Probe with the first configured key, or skip when there is none.
    pub async fn probe(&self, api_key: Option<&str>) -> ProbeStatus {
        match api_key {
            None => ProbeStatus::Skip,
            Some(key) => ProbeStatus::from_result("gemini", self.generate_ping(key).await),
        }
    }
}
