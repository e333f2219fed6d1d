// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Account models for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const ADMIN_ROLE: &str = "admin";

/// Learner account stored at `user/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserAccount {
    /// Identity-provider subject (also used as document ID)
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub college: String,
    /// Always false for learner accounts
    #[serde(default)]
    pub is_admin: bool,
    /// Read module text aloud
    #[serde(default)]
    pub audio_enabled: bool,
    pub created_at: String,
}

impl UserAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

/// Admin account stored at `admin/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AdminAccount {
    /// Identity-provider subject (also used as document ID)
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    /// Always "admin"
    pub role: String,
    pub created_at: String,
}
