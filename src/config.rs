// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup and never change while the process runs.

use std::collections::BTreeSet;
use std::env;

/// Invitation code accepted when `ADMIN_INVITE_CODE` is not set.
/// Insecure: anyone reading the source can register as an admin.
pub const DEFAULT_ADMIN_INVITE_CODE: &str = "pbk";

/// Model used for the Gemini connectivity probe when `GEMINI_MODEL` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Highest numbered `GEMINI_API_KEY_<n>` variable that is read.
const MAX_GEMINI_KEYS: usize = 9;

/// Runtime mode. Development unlocks diagnostic routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Runtime mode
    pub app_env: AppEnv,
    /// Supabase project URL, e.g. `https://xyz.supabase.co`
    pub supabase_url: String,
    /// Gemini model used for the diagnostic probe
    pub gemini_model: String,

    // --- Secrets ---
    /// Public (anonymous tier) API key
    pub supabase_anon_key: String,
    /// Privileged service-role API key. Never sent to callers.
    pub supabase_service_role_key: String,
    /// Secret that unlocks admin signup (trimmed at load)
    pub admin_invite_code: String,
    /// Gemini API keys in order: `GEMINI_API_KEY`, then `GEMINI_API_KEY_2`..
    pub gemini_api_keys: Vec<String>,

    /// Allow-listed variables that were unset and got their value some other
    /// way (compiled-in fallback, or a numbered sibling key).
    pub defaulted: BTreeSet<&'static str>,
}

impl Config {
    /// Config for tests: development mode, no external keys.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            app_env: AppEnv::Development,
            supabase_url: "http://127.0.0.1:54321".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            supabase_service_role_key: "test_service_role_key".to_string(),
            admin_invite_code: "pbk".to_string(),
            gemini_api_keys: Vec::new(),
            defaulted: BTreeSet::new(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let required = |name: &'static str| -> Result<String, ConfigError> {
            match env::var(name) {
                Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        let mut defaulted = BTreeSet::new();
        let optional = |name: &'static str| -> Option<String> {
            env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let admin_invite_code = optional("ADMIN_INVITE_CODE").unwrap_or_else(|| {
            tracing::warn!("ADMIN_INVITE_CODE not set, using the insecure built-in invitation code");
            defaulted.insert("ADMIN_INVITE_CODE");
            DEFAULT_ADMIN_INVITE_CODE.to_string()
        });

        let gemini_model = optional("GEMINI_MODEL").unwrap_or_else(|| {
            defaulted.insert("GEMINI_MODEL");
            DEFAULT_GEMINI_MODEL.to_string()
        });

        if optional("GEMINI_API_KEY").is_none() {
            defaulted.insert("GEMINI_API_KEY");
        }
        let gemini_api_keys = gemini_key_names()
            .into_iter()
            .filter_map(|name| env::var(name).ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_env: AppEnv::parse(&env::var("APP_ENV").unwrap_or_default()),
            supabase_url: required("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            gemini_model,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            admin_invite_code,
            gemini_api_keys,
            defaulted,
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }

    /// Report whether each allow-listed variable was set to a non-empty value.
    /// Fallback values do not count. Never returns values.
    pub fn configured_keys(&self) -> Vec<(&'static str, bool)> {
        let keys = vec![
            ("SUPABASE_URL", !self.supabase_url.is_empty()),
            ("SUPABASE_ANON_KEY", !self.supabase_anon_key.is_empty()),
            (
                "SUPABASE_SERVICE_ROLE_KEY",
                !self.supabase_service_role_key.is_empty(),
            ),
            ("ADMIN_INVITE_CODE", !self.admin_invite_code.is_empty()),
            ("GEMINI_MODEL", !self.gemini_model.is_empty()),
            ("GEMINI_API_KEY", !self.gemini_api_keys.is_empty()),
        ];

        keys.into_iter()
            .map(|(key, set)| (key, set && !self.defaulted.contains(key)))
            .collect()
    }
}

/// `GEMINI_API_KEY`, `GEMINI_API_KEY_2`, .. `GEMINI_API_KEY_9`.
fn gemini_key_names() -> Vec<String> {
    std::iter::once("GEMINI_API_KEY".to_string())
        .chain((2..=MAX_GEMINI_KEYS).map(|n| format!("GEMINI_API_KEY_{n}")))
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
