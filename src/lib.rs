// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Course Forge: AI-assisted course authoring and learner progress tracking.
//!
//! Admins turn uploaded documents, scraped pages and saved snippets into
//! multi-module courses; learners work through modules, take generated
//! quizzes and accumulate time, warning and accuracy analytics.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{AiService, IdentityVerifier, ProgressService, ScraperClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: Arc<IdentityVerifier>,
    pub ai: AiService,
    pub scraper: ScraperClient,
}

impl AppState {
    /// Progress workflow bound to this state's database and AI service.
    pub fn progress(&self) -> ProgressService {
        ProgressService::new(self.db.clone(), self.ai.clone())
    }
}
