// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! School-admin API: account provisioning and per-school settings
//!
//! This crate provides the backend API behind the school administration
//! frontend. Accounts and tables live in a hosted Supabase project; this
//! service authorizes callers and resolves per-school configuration.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{IdentityAdmin, IdentityProvider, SchoolStore};
use services::GeminiClient;
use std::sync::Arc;

/// Shared application state.
///
/// `identity` acts with the caller-tier key; `admin` and `store` act with the
/// privileged key.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub admin: Arc<dyn IdentityAdmin>,
    pub store: Arc<dyn SchoolStore>,
    pub gemini: GeminiClient,
}
