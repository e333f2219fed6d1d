// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Auth cookie attribute tests.
//!
//! These tests verify that logout removes both role cookies with the same
//! attributes they were created with, for localhost and production frontends.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use tower::ServiceExt;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

async fn logout(frontend_url: &str) -> Response {
    let (app, _) = common::create_test_app_with_frontend_url(frontend_url).await;

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .header(
                header::COOKIE,
                "userSessionCred=learner; userSessionCredAd=admin",
            )
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_logout_cookie_removal_localhost_attributes() {
    let response = logout("http://localhost:5173").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let set_cookies = set_cookie_headers(&response);
    for name in ["userSessionCred", "userSessionCredAd"] {
        let cookie = find_cookie(&set_cookies, name);
        assert!(cookie.contains("Path=/"), "{cookie}");
        assert!(cookie.contains("HttpOnly"), "{cookie}");
        assert!(cookie.contains("SameSite=Lax"), "{cookie}");
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
        assert!(!cookie.contains("Secure"), "{cookie}");
        assert!(!cookie.contains("Domain="), "{cookie}");
    }
}

#[tokio::test]
async fn test_logout_cookie_removal_production_attributes() {
    let response = logout("https://learn.example.edu").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let set_cookies = set_cookie_headers(&response);
    for name in ["userSessionCred", "userSessionCredAd"] {
        let cookie = find_cookie(&set_cookies, name);
        assert!(cookie.contains("Path=/"), "{cookie}");
        assert!(cookie.contains("HttpOnly"), "{cookie}");
        assert!(cookie.contains("SameSite=Lax"), "{cookie}");
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
        assert!(cookie.contains("Secure"), "{cookie}");
    }
}
