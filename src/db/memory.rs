// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process backend used by tests.
//!
//! Implements every backend capability on top of `DashMap`s so handlers can
//! be driven end to end without a hosted project.

use crate::db::{IdentityAdmin, IdentityProvider, SchoolStore};
use crate::error::AppError;
use crate::models::{Identity, ProfileUpdate, SettingsRow, UserPoints};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory accounts, tokens and tables.
#[derive(Default)]
pub struct MemoryBackend {
    users: DashMap<String, Identity>,
    tokens: DashMap<String, String>,
    passwords: DashMap<String, String>,
    settings: DashMap<String, serde_json::Value>,
    points: DashMap<String, UserPoints>,
    /// When set, every call fails as an unreachable upstream would.
    offline: AtomicBool,
    token_lookups: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, identity: Identity) {
        self.users.insert(identity.id.clone(), identity);
    }

    /// Make `token` resolve to the account `user_id`.
    pub fn issue_token(&self, token: &str, user_id: &str) {
        self.tokens.insert(token.to_string(), user_id.to_string());
    }

    pub fn set_settings(&self, school_name: &str, blob: serde_json::Value) {
        self.settings.insert(school_name.to_string(), blob);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn user(&self, id: &str) -> Option<Identity> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn password(&self, id: &str) -> Option<String> {
        self.passwords.get(id).map(|p| p.clone())
    }

    pub fn points(&self, user_email: &str) -> Option<UserPoints> {
        self.points.get(user_email).map(|p| p.clone())
    }

    /// Number of token resolutions performed.
    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }

    /// Number of successful writes of any kind.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("memory backend offline".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn user_for_token(&self, token: &str) -> Result<Option<Identity>, AppError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self
            .tokens
            .get(token)
            .and_then(|id| self.users.get(id.value()).map(|u| u.clone())))
    }

    async fn health(&self) -> Result<(), AppError> {
        self.check_online()
    }
}

#[async_trait]
impl IdentityAdmin for MemoryBackend {
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<Identity>, AppError> {
        self.check_online()?;
        let mut users: Vec<Identity> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));

        let skip = (page.max(1) as usize - 1).saturating_mul(per_page as usize);
        Ok(users
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<Identity>, AppError> {
        self.check_online()?;
        Ok(self.user(id))
    }

    async fn update_metadata(&self, id: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        self.check_online()?;
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| AppError::Upstream(format!("HTTP 404: user {} not found", id)))?;

        user.metadata.role = Some(update.role);
        user.metadata.role_present = true;
        user.metadata.name = update.name.clone();
        user.metadata.school_name = update.school_name.clone();
        user.metadata.grade_class = update.grade_class.clone();
        drop(user);

        self.record_write();
        Ok(())
    }

    async fn set_password(&self, id: &str, password: &str) -> Result<(), AppError> {
        self.check_online()?;
        if !self.users.contains_key(id) {
            return Err(AppError::Upstream(format!("HTTP 404: user {} not found", id)));
        }
        self.passwords.insert(id.to_string(), password.to_string());
        self.record_write();
        Ok(())
    }
}

#[async_trait]
impl SchoolStore for MemoryBackend {
    async fn get_settings_row(&self, school_name: &str) -> Result<Option<SettingsRow>, AppError> {
        self.check_online()?;
        Ok(self.settings.get(school_name).map(|blob| SettingsRow {
            school_name: school_name.to_string(),
            settings: blob.clone(),
        }))
    }

    async fn upsert_points(&self, points: &UserPoints) -> Result<(), AppError> {
        self.check_online()?;
        self.points.insert(points.user_email.clone(), points.clone());
        self.record_write();
        Ok(())
    }

    async fn get_points(&self, user_email: &str) -> Result<Option<UserPoints>, AppError> {
        self.check_online()?;
        Ok(self.points(user_email))
    }
}
