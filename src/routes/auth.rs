// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Sign-in and sign-out routes.
//!
//! The identity provider's ID token is verified once here; afterwards the
//! role's session cookie carries the account ID.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_token, Role, ADMIN_COOKIE, LEARNER_COOKIE};
use crate::models::user::ADMIN_ROLE;
use crate::models::{AdminAccount, UserAccount};
use crate::routes::validated;
use crate::services::{IdentityError, VerifiedIdentity};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/logout", post(logout))
}

/// Profile fields supplied at learner sign-up.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub surname: Option<String>,
    #[validate(length(max = 100))]
    pub branch: Option<String>,
    #[validate(length(max = 200))]
    pub college: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1))]
    pub id_token: String,
    pub role: Role,
    #[validate(nested)]
    pub profile: Option<ProfileInput>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub account_id: String,
    pub name: String,
    pub email: Option<String>,
    pub is_admin: bool,
    /// True when this sign-in created the account
    pub created: bool,
}

/// Verify an ID token, create the account on first sign-in, and set the role cookie.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let body = validated(body)?;

    let identity = state
        .identity
        .verify_id_token(&body.id_token)
        .await
        .map_err(|e| match e {
            IdentityError::Rejected(reason) => {
                tracing::warn!(reason = %reason, "ID token rejected");
                AppError::InvalidToken
            }
            IdentityError::Transient(reason) => {
                AppError::Internal(anyhow::anyhow!("identity provider: {}", reason))
            }
        })?;

    let response = match body.role {
        Role::Learner => learner_session(&state, &identity, body.profile).await?,
        Role::Admin => admin_session(&state, &identity).await?,
    };

    let token = create_session_token(
        &identity.uid,
        body.role,
        &state.config.session_signing_key,
        state.config.session_ttl_days,
    )?;

    tracing::info!(
        account_id = %identity.uid,
        role = ?body.role,
        created = response.created,
        "Session started"
    );

    let cookie = session_cookie(&state.config, body.role.cookie_name(), token);
    Ok((jar.add(cookie), Json(response)))
}

async fn learner_session(
    state: &AppState,
    identity: &VerifiedIdentity,
    profile: Option<ProfileInput>,
) -> Result<SessionResponse> {
    let (account, created) = match state.db.get_user(&identity.uid).await? {
        Some(account) => (account, false),
        None => {
            let account = new_learner(identity, profile.unwrap_or_default());
            state.db.upsert_user(&account).await?;
            (account, true)
        }
    };

    Ok(SessionResponse {
        account_id: account.id.clone(),
        name: account.full_name(),
        email: account.email,
        is_admin: false,
        created,
    })
}

async fn admin_session(state: &AppState, identity: &VerifiedIdentity) -> Result<SessionResponse> {
    ensure_admin_allowed(&state.config, identity)?;

    let (account, created) = match state.db.get_admin(&identity.uid).await? {
        Some(account) => (account, false),
        None => {
            let account = AdminAccount {
                id: identity.uid.clone(),
                email: identity.email.clone(),
                name: identity.name.clone().unwrap_or_default(),
                role: ADMIN_ROLE.to_string(),
                created_at: now_rfc3339(),
            };
            state.db.upsert_admin(&account).await?;
            (account, true)
        }
    };

    Ok(SessionResponse {
        account_id: account.id,
        name: account.name,
        email: account.email,
        is_admin: true,
        created,
    })
}

/// Reject admin sign-in for identities outside the configured allowlist.
///
/// Only a provider-verified email can match an allowlist entry.
fn ensure_admin_allowed(config: &Config, identity: &VerifiedIdentity) -> Result<()> {
    let email = identity
        .email
        .as_deref()
        .filter(|_| identity.email_verified);
    if config.admin_allowed(email) {
        return Ok(());
    }
    tracing::warn!(account_id = %identity.uid, "Admin sign-in outside allowlist");
    Err(AppError::Forbidden(
        "account is not permitted to sign in as admin".to_string(),
    ))
}

fn new_learner(identity: &VerifiedIdentity, profile: ProfileInput) -> UserAccount {
    let name = profile
        .name
        .or_else(|| identity.name.clone())
        .unwrap_or_default();

    UserAccount {
        id: identity.uid.clone(),
        email: identity.email.clone(),
        name,
        surname: profile.surname.unwrap_or_default(),
        branch: profile.branch.unwrap_or_default(),
        college: profile.college.unwrap_or_default(),
        is_admin: false,
        audio_enabled: false,
        created_at: now_rfc3339(),
    }
}

fn session_cookie(config: &Config, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::days(config.session_ttl_days))
        .build()
}

/// Removal cookie with the same attributes the session cookie was set with.
fn removal_cookie(config: &Config, name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}

/// Clear both role cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar
        .remove(removal_cookie(&state.config, LEARNER_COOKIE))
        .remove(removal_cookie(&state.config, ADMIN_COOKIE));
    (StatusCode::NO_CONTENT, jar)
}

/// Clear the learner cookie after account deletion.
pub(crate) fn clear_learner_cookie(config: &Config, jar: CookieJar) -> CookieJar {
    jar.remove(removal_cookie(config, LEARNER_COOKIE))
}
