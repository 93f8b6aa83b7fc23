// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend capabilities (hosted auth + tables).
//!
//! The caller-tier and privileged credentials are separate handles:
//! - [`IdentityProvider`] only resolves a caller's own token (public key).
//! - [`IdentityAdmin`] and [`SchoolStore`] act with the service-role key.

pub mod memory;
pub mod supabase;

pub use memory::MemoryBackend;
pub use supabase::{SupabaseAdmin, SupabaseAuth};

use crate::error::AppError;
use crate::models::{Identity, ProfileUpdate, SettingsRow, UserPoints};
use async_trait::async_trait;

/// Table names as constants.
pub mod tables {
    pub const SCHOOL_SETTINGS: &str = "school_settings";
    /// Per-user points (keyed by user_email)
    pub const USER_POINTS: &str = "user_points";
}

/// Largest page the provider returns when enumerating accounts.
pub const MAX_USERS_PER_PAGE: u32 = 1000;

/// Caller-tier access: resolve a bearer token to its account.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns `Ok(None)` when the token is invalid or expired.
    async fn user_for_token(&self, token: &str) -> Result<Option<Identity>, AppError>;

    /// Cheap reachability check.
    async fn health(&self) -> Result<(), AppError>;
}

/// Privileged account administration.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
    /// One page of accounts. Pages are 1-indexed.
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<Identity>, AppError>;

    async fn get_user(&self, id: &str) -> Result<Option<Identity>, AppError>;

    /// Merge the profile fields into the account's metadata.
    async fn update_metadata(&self, id: &str, update: &ProfileUpdate) -> Result<(), AppError>;

    async fn set_password(&self, id: &str, password: &str) -> Result<(), AppError>;
}

/// Privileged access to the school tables.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    /// Exact (case-sensitive) match on school name.
    async fn get_settings_row(&self, school_name: &str) -> Result<Option<SettingsRow>, AppError>;

    /// Insert or fully overwrite the row for `points.user_email`.
    async fn upsert_points(&self, points: &UserPoints) -> Result<(), AppError>;

    async fn get_points(&self, user_email: &str) -> Result<Option<UserPoints>, AppError>;
}
