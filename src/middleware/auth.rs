// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Session cookie authentication middleware.
//!
//! Learners and admins carry separate cookies. Each holds an HS256 session
//! token whose subject is the account ID and whose `role` claim names the
//! cookie's role. After the signature check the account must still exist.

use crate::error::AppError;
use crate::models::{AdminAccount, UserAccount};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Learner session cookie.
pub const LEARNER_COOKIE: &str = "userSessionCred";
/// Admin session cookie.
pub const ADMIN_COOKIE: &str = "userSessionCredAd";

/// Account role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Admin,
}

impl Role {
    pub fn cookie_name(self) -> &'static str {
        match self {
            Role::Learner => LEARNER_COOKIE,
            Role::Admin => ADMIN_COOKIE,
        }
    }
}

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Account ID (identity-provider subject)
    pub sub: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated learner.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account: UserAccount,
}

/// Authenticated admin.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub account: AdminAccount,
}

/// Cookie value first, then a `Bearer` header.
fn session_token(jar: &CookieJar, request: &Request, role: Role) -> Option<String> {
    if let Some(cookie) = jar.get(role.cookie_name()) {
        return Some(cookie.value().to_string());
    }
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Validate a session token's signature, expiry and role.
pub fn verify_session_token(
    token: &str,
    signing_key: &[u8],
    expected: Role,
) -> Result<SessionClaims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|_| AppError::InvalidToken)?
        .claims;

    if claims.role != expected {
        return Err(AppError::Forbidden(format!(
            "{:?} session cannot access this route",
            claims.role
        )));
    }
    Ok(claims)
}

/// Middleware that requires a learner session.
pub async fn require_learner(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, &request, Role::Learner).ok_or(AppError::Unauthorized)?;
    let claims = verify_session_token(&token, &state.config.session_signing_key, Role::Learner)?;

    let account = state.db.get_user(&claims.sub).await?.ok_or_else(|| {
        tracing::warn!(user_id = %claims.sub, "Session for missing learner account");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthUser { account });
    Ok(next.run(request).await)
}

/// Middleware that requires an admin session.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, &request, Role::Admin).ok_or(AppError::Unauthorized)?;
    let claims = verify_session_token(&token, &state.config.session_signing_key, Role::Admin)?;

    let account = state.db.get_admin(&claims.sub).await?.ok_or_else(|| {
        tracing::warn!(admin_id = %claims.sub, "Session for missing admin account");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthAdmin { account });
    Ok(next.run(request).await)
}

/// Create a session token.
pub fn create_session_token(
    account_id: &str,
    role: Role,
    signing_key: &[u8],
    ttl_days: i64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
    let ttl_secs = usize::try_from(ttl_days.max(1))? * 24 * 60 * 60;

    let claims = SessionClaims {
        sub: account_id.to_string(),
        role,
        iat: now,
        exp: now + ttl_secs,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
