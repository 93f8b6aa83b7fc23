// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! School settings resolution.
//!
//! Turns a stored `school_settings` row into a complete [`SchoolSettings`].
//! Stored blobs are versioned:
//! - v1 (no `version` field): categories may be plain strings and domain
//!   prompts may live under `questions`.
//! - v2: categories are `{id, name, unit}` objects, prompts live under `items`.
//!
//! Results are default-or-full: a blob that cannot be read as a supported
//! version, or lacks its six diagnosis domains, resolves to the compiled-in
//! defaults as a whole. Only the title defaults on its own. Parsing never
//! fails from the caller's point of view.

use crate::models::settings::{
    Category, DiagnosisDomain, SchoolSettings, SettingsRow, DOMAIN_COUNT,
    SETTINGS_SCHEMA_VERSION,
};
use serde::Deserialize;

/// Reasons a stored blob is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings blob is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("settings blob has an unexpected shape: {0}")]
    Shape(String),

    #[error("unsupported settings schema version {0}")]
    UnsupportedVersion(u32),

    #[error("expected 6 diagnosis domains, found {0}")]
    DomainCount(usize),

    #[error("settings blob has no diagnosis domains")]
    MissingDomains,
}

/// Union of every supported stored layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    categories: Option<Vec<StoredCategory>>,
    #[serde(default)]
    diagnosis_domains: Option<Vec<StoredDomain>>,
    #[serde(default)]
    diagnosis_title: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredCategory {
    Full(Category),
    /// v1 stored bare category names.
    Name(String),
}

#[derive(Debug, Deserialize)]
struct StoredDomain {
    name: String,
    #[serde(alias = "questions")]
    items: Vec<String>,
}

/// Resolve the settings for a school from its (possibly missing) row.
pub fn parse(row: Option<&SettingsRow>) -> SchoolSettings {
    let Some(row) = row else {
        return SchoolSettings::default();
    };

    match decode(&row.settings) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(
                school = %row.school_name,
                error = %e,
                "Stored school settings unusable, falling back to defaults"
            );
            SchoolSettings::default()
        }
    }
}

/// Decode a stored blob, migrating older versions to the current schema.
///
/// `null` and empty strings count as "no settings" and yield the defaults.
pub fn decode(blob: &serde_json::Value) -> Result<SchoolSettings, SettingsError> {
    let value = match blob {
        serde_json::Value::Null => return Ok(SchoolSettings::default()),
        serde_json::Value::String(s) if s.trim().is_empty() => {
            return Ok(SchoolSettings::default())
        }
        serde_json::Value::String(s) => {
            serde_json::from_str(s).map_err(|e| SettingsError::InvalidJson(e.to_string()))?
        }
        other => other.clone(),
    };

    if !value.is_object() {
        return Err(SettingsError::Shape("top level is not an object".to_string()));
    }

    let stored: StoredSettings =
        serde_json::from_value(value).map_err(|e| SettingsError::Shape(e.to_string()))?;

    migrate(stored)
}

fn migrate(stored: StoredSettings) -> Result<SchoolSettings, SettingsError> {
    let version = stored.version.unwrap_or(1);
    if version == 0 || version > SETTINGS_SCHEMA_VERSION {
        return Err(SettingsError::UnsupportedVersion(version));
    }

    // Default or full: a blob without its domains is not a usable settings value.
    let diagnosis_domains = match stored.diagnosis_domains {
        Some(domains) => to_domain_array(domains)?,
        None => return Err(SettingsError::MissingDomains),
    };

    let categories = stored
        .categories
        .unwrap_or_default()
        .into_iter()
        .map(|c| match c {
            StoredCategory::Full(category) => category,
            StoredCategory::Name(name) => Category {
                id: name.clone(),
                name,
                unit: String::new(),
            },
        })
        .collect();

    let diagnosis_title = match stored.diagnosis_title {
        Some(serde_json::Value::String(title)) => title,
        _ => String::new(),
    };

    Ok(SchoolSettings {
        version: SETTINGS_SCHEMA_VERSION,
        categories,
        diagnosis_domains,
        diagnosis_title,
    })
}

fn to_domain_array(
    domains: Vec<StoredDomain>,
) -> Result<[DiagnosisDomain; DOMAIN_COUNT], SettingsError> {
    let count = domains.len();
    let converted: Vec<DiagnosisDomain> = domains
        .into_iter()
        .map(|d| DiagnosisDomain {
            name: d.name,
            items: d.items,
        })
        .collect();

    converted
        .try_into()
        .map_err(|_| SettingsError::DomainCount(count))
}
