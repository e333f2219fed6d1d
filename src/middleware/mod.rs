// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Middleware modules (authentication, security, etc.).

pub mod auth;
pub mod security;

pub use auth::{require_admin, require_learner, AuthAdmin, AuthUser, Role};
