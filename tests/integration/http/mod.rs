//! HTTP surface tests
//!
//! Drives the application router with `oneshot` and checks status mapping
//! and that rejection bodies stay generic.

use axum::http::{Method, StatusCode};
use bazaar_auth::{AccountStatus, Role, TokenKind};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{body_json, request, sign_raw, TestApp, AUDIENCE, ISSUER};

#[test_log::test(tokio::test)]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn test_me_returns_live_subject() {
    let app = TestApp::new();
    app.add_subject("u1", Role::User);
    let token = app.token("u1", Role::User);

    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "u1");
    assert_eq!(body["role"], "user");
    assert_eq!(body["email_verified"], true);
}

#[test_log::test(tokio::test)]
async fn test_missing_header_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({"error": {"code": "UNAUTHORIZED", "message": "Unauthorized"}})
    );
}

#[test_log::test(tokio::test)]
async fn test_tampered_claims_do_not_leak_field_detail() {
    let app = TestApp::new();
    app.add_subject("u1", Role::User);
    let token = sign_raw(&json!({
        "id": "u1", "role": "overlord", "jti": "nope", "iat": 1, "exp": 2,
        "aud": AUDIENCE, "iss": ISSUER,
    }));

    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Unauthorized");
    let text = body.to_string();
    assert!(!text.contains("jti"));
    assert!(!text.contains("role"));
}

#[test_log::test(tokio::test)]
async fn test_unknown_subject_is_unauthorized_not_not_found() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/v1/me",
            Some(&app.token("ghost", Role::User)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_role_and_block_failures_are_forbidden() {
    let app = TestApp::new();
    app.add_subject("u1", Role::User);
    app.add_subject_with("u2", Role::Admin, AccountStatus::Blocked, true);

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/v1/admin/me",
            Some(&app.token("u1", Role::User)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        json!({"error": {"code": "FORBIDDEN", "message": "Forbidden"}})
    );

    let response = app
        .router()
        .oneshot(request(
            Method::GET,
            "/v1/admin/me",
            Some(&app.token("u2", Role::Admin)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn test_tier_routes() {
    let app = TestApp::new();
    app.add_subject("root", Role::SuperAdmin);
    let token = app.token("root", Role::SuperAdmin);

    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/super-admin/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "superAdmin");

    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/admin/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn test_reset_password_token_is_not_a_session() {
    let app = TestApp::new();
    let subject = app.add_subject("u1", Role::User);
    let issued = app
        .issuer
        .issue(&subject, TokenKind::ResetPassword)
        .unwrap();

    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/me", Some(&issued.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_logout_revokes_presented_token() {
    let app = TestApp::new();
    app.add_subject("u1", Role::User);
    let token = app.token("u1", Role::User);

    let response = app
        .router()
        .oneshot(request(Method::POST, "/v1/auth/logout", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.denylist.len(), 1);

    // read-your-writes: the very next request sees the revocation
    let response = app
        .router()
        .oneshot(request(Method::GET, "/v1/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
