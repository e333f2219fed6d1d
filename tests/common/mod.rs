// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

use async_trait::async_trait;
use course_forge::config::Config;
use course_forge::db::FirestoreDb;
use course_forge::error::AppError;
use course_forge::middleware::auth::{create_session_token, Role};
use course_forge::routes::create_router;
use course_forge::services::{AiService, IdentityVerifier, ScraperClient, TextGenerator};
use course_forge::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Generator that always returns the same text.
#[allow(dead_code)]
pub struct FixedGenerator(pub String);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Ok(self.0.clone())
    }
}

/// Fixed-response generator that counts how often it was asked.
#[allow(dead_code)]
pub struct CountingGenerator {
    response: String,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingGenerator {
    pub fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// AI service backed by a fixed response.
#[allow(dead_code)]
pub fn fixed_ai(response: &str, config: &Config) -> AiService {
    AiService::new(
        Arc::new(FixedGenerator(response.to_string())),
        config.max_prompt_chars,
    )
}

fn build_state(config: Config, db: FirestoreDb, ai: AiService) -> Arc<AppState> {
    let identity = Arc::new(IdentityVerifier::new(&config).expect("identity verifier"));
    let scraper = ScraperClient::new(&config).expect("scraper client");

    Arc::new(AppState {
        config,
        db,
        identity,
        ai,
        scraper,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let ai = fixed_ai(r#"{"correct": true, "feedback": "Well done."}"#, &config);
    let state = build_state(config, test_db_offline(), ai);
    (create_router(state.clone()), state)
}

/// Create a test app whose frontend URL drives cookie security.
#[allow(dead_code)]
pub async fn create_test_app_with_frontend_url(
    frontend_url: &str,
) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    let ai = fixed_ai("", &config);
    let state = build_state(config, test_db_offline(), ai);
    (create_router(state.clone()), state)
}

/// Session token for the given account and role, signed with the test key.
#[allow(dead_code)]
pub fn session_token(state: &AppState, account_id: &str, role: Role) -> String {
    create_session_token(
        account_id,
        role,
        &state.config.session_signing_key,
        state.config.session_ttl_days,
    )
    .expect("session token")
}
