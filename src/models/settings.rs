// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-school configuration: scoring categories and diagnosis domains.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of diagnosis domains every school uses.
pub const DOMAIN_COUNT: usize = 6;

/// Current schema version of the stored settings blob.
pub const SETTINGS_SCHEMA_VERSION: u32 = 2;

/// A named scoring category with its display unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
}

/// One competency area and its self-assessment prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DiagnosisDomain {
    pub name: String,
    pub items: Vec<String>,
}

/// Fully resolved settings for one school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolSettings {
    pub version: u32,
    pub categories: Vec<Category>,
    pub diagnosis_domains: [DiagnosisDomain; DOMAIN_COUNT],
    pub diagnosis_title: String,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_SCHEMA_VERSION,
            categories: Vec::new(),
            diagnosis_domains: default_domains(),
            diagnosis_title: String::new(),
        }
    }
}

/// Row in the `school_settings` table.
///
/// `settings` is stored either as a JSON object or as a string holding one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsRow {
    pub school_name: String,
    #[serde(default)]
    pub settings: serde_json::Value,
}

fn domain(name: &str, items: [&str; 5]) -> DiagnosisDomain {
    DiagnosisDomain {
        name: name.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

/// Compiled-in domain set used whenever a school has no valid configuration.
pub fn default_domains() -> [DiagnosisDomain; DOMAIN_COUNT] {
    [
        domain(
            "Self-Awareness",
            [
                "I can describe how I am feeling.",
                "I know what I am good at.",
                "I know which things are hard for me.",
                "I understand how my feelings affect what I do.",
                "I believe I can get better when I practice.",
            ],
        ),
        domain(
            "Self-Management",
            [
                "I can calm myself down when I am upset.",
                "I finish my work even when it is hard.",
                "I set goals and work toward them.",
                "I follow classroom routines without reminders.",
                "I wait for my turn patiently.",
            ],
        ),
        domain(
            "Social Awareness",
            [
                "I notice when a classmate is sad.",
                "I listen to others without interrupting.",
                "I respect people who are different from me.",
                "I try to understand other points of view.",
                "I thank people who help me.",
            ],
        ),
        domain(
            "Relationship Skills",
            [
                "I get along well with my classmates.",
                "I can work with others in a group.",
                "I ask for help when I need it.",
                "I help friends who are having trouble.",
                "I solve disagreements by talking.",
            ],
        ),
        domain(
            "Responsible Decision-Making",
            [
                "I think about what will happen before I act.",
                "I make safe choices.",
                "I take responsibility for my mistakes.",
                "I can find more than one way to solve a problem.",
                "I keep the promises I make.",
            ],
        ),
        domain(
            "Community Engagement",
            [
                "I take care of my classroom and school.",
                "I join in class and school activities.",
                "I follow rules that keep everyone safe.",
                "I want to help make my community better.",
                "I treat shared things with care.",
            ],
        ),
    ]
}
