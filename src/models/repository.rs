// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Saved text snippets reused across course creations.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where a snippet's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SnippetSource {
    Upload,
    Scrape,
    Pdf,
    Manual,
}

/// Repository entry stored at `admin/{admin_id}/Database/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RepositoryEntry {
    pub id: String,
    pub title: String,
    pub source: SnippetSource,
    /// Original file name or URL
    pub origin: Option<String>,
    pub text: String,
    pub char_count: u32,
    pub created_at: String,
}

impl RepositoryEntry {
    pub fn new(
        title: String,
        source: SnippetSource,
        origin: Option<String>,
        text: String,
        now: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            source,
            origin,
            char_count: text.chars().count() as u32,
            text,
            created_at: now.to_string(),
        }
    }
}
