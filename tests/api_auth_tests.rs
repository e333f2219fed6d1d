// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Learner and admin routes reject requests without a session
//! 2. Sessions are accepted by cookie or Bearer header for their own role only
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use course_forge::middleware::auth::Role;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_learner_route_without_session() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_route_without_session() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_learner_route_with_invalid_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/stats")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_learner_cookie_passes_token_check() {
    let (app, state) = common::create_test_app();
    let token = common::session_token(&state, "learner-1", Role::Learner);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/stats")
                .header(header::COOKIE, format!("userSessionCred={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The account lookup runs against the offline database, so a passing
    // token check surfaces as 500 rather than 401.
    let status = response.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR,
        "Expected 200 or 500, got {}",
        status
    );
}

#[tokio::test]
async fn test_admin_bearer_passes_token_check() {
    let (app, state) = common::create_test_app();
    let token = common::session_token(&state, "admin-1", Role::Admin);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/repository")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR,
        "Expected 200 or 500, got {}",
        status
    );
}

#[tokio::test]
async fn test_learner_session_cannot_reach_admin_routes() {
    let (app, state) = common::create_test_app();
    let token = common::session_token(&state, "learner-1", Role::Learner);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/courses")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_learner_cookie_is_not_an_admin_cookie() {
    let (app, state) = common::create_test_app();
    let token = common::session_token(&state, "learner-1", Role::Learner);

    // Only the learner cookie is present, so the admin gate sees no session.
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/me")
                .header(header::COOKIE, format!("userSessionCred={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_rejects_invalid_id_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/session")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"id_token": "not-a-jwt", "role": "learner"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_rejects_empty_id_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/session")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"id_token": "", "role": "admin"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/enrollments")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
}
