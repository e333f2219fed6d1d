// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Secrets (session signing
//! key, AI API key) are read once at startup and kept in memory.

use std::env;
use std::time::Duration;

const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_MAX_PROMPT_CHARS: usize = 30_000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (CORS origin and cookie security decisions)
    pub frontend_url: String,
    /// GCP project ID (Firestore database and identity-token audience)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Base URL of the generative-text API
    pub ai_base_url: String,
    /// Model name used for every generation call
    pub ai_model: String,
    /// Request timeout for generation calls
    pub ai_timeout: Duration,
    /// Link scraping service base URL
    pub scrape_service_url: String,
    /// PDF search / PDF-to-text service base URL
    pub pdf_service_url: String,
    /// Video search service base URL
    pub video_search_url: String,
    /// Request timeout for scraping/search calls
    pub scraper_timeout: Duration,
    /// Largest accepted upload for document ingestion
    pub max_upload_bytes: usize,
    /// Source text is truncated to this many characters before prompting
    pub max_prompt_chars: usize,
    /// Session lifetime in days
    pub session_ttl_days: i64,
    /// Emails allowed to sign in as admin (lowercase); empty allows any verified identity
    pub admin_emails: Vec<String>,

    // --- Secrets ---
    /// HS256 key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// API key for the generative-text API
    pub ai_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080),
            ai_base_url: env::var("AI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            ai_timeout: Duration::from_secs(parse_or("AI_TIMEOUT_SECS", 60)),
            scrape_service_url: required("SCRAPE_SERVICE_URL")?,
            pdf_service_url: required("PDF_SERVICE_URL")?,
            video_search_url: required("VIDEO_SEARCH_URL")?,
            scraper_timeout: Duration::from_secs(parse_or("SCRAPER_TIMEOUT_SECS", 30)),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            max_prompt_chars: parse_or("MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS),
            session_ttl_days: parse_or("SESSION_TTL_DAYS", 30),
            admin_emails: parse_list("ADMIN_EMAILS"),

            session_signing_key: required("SESSION_SIGNING_KEY")?.into_bytes(),
            ai_api_key: required("AI_API_KEY")?,
        })
    }

    /// Config for tests: no network endpoints are reachable.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            ai_base_url: "http://127.0.0.1:9".to_string(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            ai_timeout: Duration::from_secs(1),
            scrape_service_url: "http://127.0.0.1:9".to_string(),
            pdf_service_url: "http://127.0.0.1:9".to_string(),
            video_search_url: "http://127.0.0.1:9".to_string(),
            scraper_timeout: Duration::from_secs(1),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            session_ttl_days: 30,
            admin_emails: Vec::new(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            ai_api_key: "test_ai_key".to_string(),
        }
    }

    /// Whether an identity with this email may hold an admin session.
    pub fn admin_allowed(&self, email: Option<&str>) -> bool {
        if self.admin_emails.is_empty() {
            return true;
        }
        email.is_some_and(|email| {
            let email = email.trim().to_lowercase();
            self.admin_emails.iter().any(|allowed| *allowed == email)
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !(self.frontend_url.starts_with("http://localhost")
            || self.frontend_url.starts_with("http://127.0.0.1"))
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Comma-separated list, trimmed and lowercased; blank entries dropped.
fn parse_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|v| {
            v.split(',')
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("SESSION_SIGNING_KEY", "test_session_key_32_bytes_min!!!");
        env::set_var("AI_API_KEY", "  key-with-padding \n");
        env::set_var("SCRAPE_SERVICE_URL", "http://scrape.local");
        env::set_var("PDF_SERVICE_URL", "http://pdf.local");
        env::set_var("VIDEO_SEARCH_URL", "http://video.local");
        env::set_var("ADMIN_EMAILS", " Dean@Example.edu, ,registrar@example.edu ");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.ai_api_key, "key-with-padding");
        assert_eq!(config.scrape_service_url, "http://scrape.local");
        assert_eq!(config.max_prompt_chars, DEFAULT_MAX_PROMPT_CHARS);
        assert_eq!(
            config.admin_emails,
            vec!["dean@example.edu", "registrar@example.edu"]
        );
    }

    #[test]
    fn test_admin_allowlist() {
        let mut config = Config::test_default();
        assert!(config.admin_allowed(None));
        assert!(config.admin_allowed(Some("anyone@example.com")));

        config.admin_emails = vec!["dean@example.edu".to_string()];
        assert!(config.admin_allowed(Some("Dean@Example.edu")));
        assert!(!config.admin_allowed(Some("student@example.edu")));
        assert!(!config.admin_allowed(None));
    }

    #[test]
    fn test_secure_cookies_by_frontend() {
        let mut config = Config::test_default();
        assert!(!config.secure_cookies());

        config.frontend_url = "https://learn.example.edu".to_string();
        assert!(config.secure_cookies());
    }
}
