// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user points record.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Base points granted by initialization.
pub const INITIAL_BASE_POINTS: i64 = 100;

/// Row in the `user_points` table, keyed by `user_email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserPoints {
    pub user_email: String,
    pub base_points: i64,
    #[serde(default)]
    pub login_points: i64,
    /// Date of the last login award ("YYYY-MM-DD")
    #[serde(default)]
    pub last_login_date: Option<String>,
    #[serde(default)]
    pub login_points_that_day: i64,
    /// Last update timestamp (RFC3339)
    pub updated_at: String,
}

impl UserPoints {
    /// A freshly initialized record. Initialization always overwrites.
    pub fn initial(user_email: impl Into<String>, updated_at: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            base_points: INITIAL_BASE_POINTS,
            login_points: 0,
            last_login_date: None,
            login_points_that_day: 0,
            updated_at: updated_at.into(),
        }
    }
}
