// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod identity;
pub mod points;
pub mod settings;

pub use identity::{Identity, ProfileUpdate, Role, TeacherSummary, UserMetadata};
pub use points::UserPoints;
pub use settings::{Category, DiagnosisDomain, SchoolSettings, SettingsRow};
