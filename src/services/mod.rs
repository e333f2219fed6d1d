// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Services module - business logic layer.

pub mod ai;
pub mod identity;
pub mod ingest;
pub mod progress;
pub mod prompts;
pub mod scraper;

pub use ai::{AiService, GeminiClient, TextGenerator};
pub use identity::{IdentityError, IdentityVerifier, VerifiedIdentity};
pub use ingest::{DocumentKind, IngestError};
pub use progress::ProgressService;
pub use scraper::ScraperClient;
