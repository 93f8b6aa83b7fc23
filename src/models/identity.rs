// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity model: accounts held by the hosted auth provider.
//!
//! The provider stores a free-form `user_metadata` blob per account. It is
//! deserialized leniently into [`RawMetadata`] and normalized exactly once
//! into the typed [`UserMetadata`] that the rest of the crate uses.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account role. Set once during profile completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Parse a role name. Exact, lowercase match only.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Role as it may appear in stored metadata: a single value or a legacy list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRole {
    One(String),
    Many(Vec<String>),
    Other(serde_json::Value),
}

/// Metadata exactly as the provider returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default)]
    pub role: Option<RawRole>,
    #[serde(default)]
    pub school_name: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub grade_class: Option<serde_json::Value>,
}

/// Typed, normalized identity metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// A role value is stored, recognized or not.
    #[serde(skip)]
    pub role_present: bool,
    pub school_name: String,
    pub name: String,
    pub grade_class: String,
}

impl From<RawMetadata> for UserMetadata {
    fn from(raw: RawMetadata) -> Self {
        Self {
            role_present: raw.role.as_ref().is_some_and(role_recorded),
            role: raw.role.and_then(normalize_role),
            school_name: string_or_empty(raw.school_name),
            name: string_or_empty(raw.name),
            grade_class: string_or_empty(raw.grade_class),
        }
    }
}

/// Collapse a stored role into one canonical value.
///
/// Legacy accounts carry a list; the first recognized entry wins.
pub fn normalize_role(raw: RawRole) -> Option<Role> {
    match raw {
        RawRole::One(value) => Role::parse(value.trim()),
        RawRole::Many(values) => values.iter().find_map(|v| Role::parse(v.trim())),
        RawRole::Other(_) => None,
    }
}

/// Whether a stored role counts as already chosen.
///
/// Anything but a blank string does, including unrecognized names and lists
/// with no recognized entry, so such accounts cannot pick a role again.
pub fn role_recorded(raw: &RawRole) -> bool {
    match raw {
        RawRole::One(value) => !value.trim().is_empty(),
        RawRole::Many(_) => true,
        RawRole::Other(value) => !value.is_null(),
    }
}

fn string_or_empty(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

/// An account as seen by this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub created_at: Option<String>,
    pub metadata: UserMetadata,
}

/// Account record in the provider's wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<RawMetadata>,
}

impl From<ProviderUser> for Identity {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            metadata: user.user_metadata.unwrap_or_default().into(),
        }
    }
}

/// Fields written by profile completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub role: Role,
    pub name: String,
    pub school_name: String,
    pub grade_class: String,
}

/// Public-safe teacher projection returned to admins.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub school_name: String,
    pub created_at: Option<String>,
}

impl From<&Identity> for TeacherSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone().unwrap_or_default(),
            name: identity.metadata.name.clone(),
            school_name: identity.metadata.school_name.clone(),
            created_at: identity.created_at.clone(),
        }
    }
}

/// Compare two school names for authorization purposes.
///
/// Names are trimmed; an empty name never matches, not even another empty one.
pub fn same_school(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a == b
}
