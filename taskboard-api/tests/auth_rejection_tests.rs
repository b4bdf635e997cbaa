/// Authentication rejection paths of both surfaces
///
/// These requests are refused before any database access, so they run
/// without PostgreSQL.

mod common;

use axum::http::StatusCode;
use common::{lazy_app, send, TEST_SECRET};
use serde_json::json;
use taskboard_shared::auth::jwt::{create_token, issue_token_pair, Claims, TokenType};
use tower::Service as _;
use uuid::Uuid;

#[tokio::test]
async fn test_versioned_api_rejects_anonymous_with_403() {
    let app = lazy_app();
    let task_id = Uuid::new_v4();
    let history_id = Uuid::new_v4();

    let uris = [
        "/api/v1/task".to_string(),
        format!("/api/v1/task/{}", task_id),
        format!("/api/v1/task/{}/history", task_id),
        format!("/api/v1/task/{}/history/{}", task_id, history_id),
    ];

    let mut messages = Vec::new();
    for uri in &uris {
        let (status, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "GET {}", uri);
        assert_eq!(body["error"], "forbidden");
        messages.push(body["message"].clone());
    }

    messages.dedup();
    assert_eq!(messages.len(), 1, "rejection message must not vary");
}

#[tokio::test]
async fn test_versioned_api_rejects_bad_tokens_uniformly() {
    let app = lazy_app();

    let wrong_secret = create_token(
        &Claims::new(Uuid::new_v4(), 0, TokenType::Access),
        "some-other-secret-that-is-32-bytes-long",
    )
    .unwrap();
    let refresh_only = issue_token_pair(Uuid::new_v4(), 0, TEST_SECRET)
        .unwrap()
        .refresh_token;

    let (anonymous_status, anonymous) = send(&app, "GET", "/api/v1/task", None, None).await;

    for token in ["not-a-jwt", wrong_secret.as_str(), refresh_only.as_str()] {
        let (status, body) = send(&app, "GET", "/api/v1/task", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(status, anonymous_status);
        assert_eq!(body, anonymous);
    }
}

#[tokio::test]
async fn test_versioned_api_rejects_anonymous_writes() {
    let app = lazy_app();
    let body = json!({ "title": "Sneaky task", "priority": 1 });

    let (status, _) = send(&app, "POST", "/api/v1/task", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/v1/task/{}", Uuid::new_v4());
    let (status, _) = send(&app, "PATCH", &uri, None, Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_app_surface_rejects_anonymous_with_401() {
    let app = lazy_app();
    let task_uri = format!("/v1/tasks/{}", Uuid::new_v4());

    for (method, uri) in [
        ("GET", "/v1/tasks"),
        ("GET", "/v1/tasks/all"),
        ("GET", "/v1/tasks/completed"),
        ("GET", task_uri.as_str()),
        ("DELETE", task_uri.as_str()),
        ("GET", "/v1/settings/email"),
        ("POST", "/v1/auth/logout"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = lazy_app();
    let access = issue_token_pair(Uuid::new_v4(), 0, TEST_SECRET)
        .unwrap()
        .access_token;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": access })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_refresh_surfaces_session_lookup_failure() {
    let app = lazy_app();
    let refresh = issue_token_pair(Uuid::new_v4(), 0, TEST_SECRET)
        .unwrap()
        .refresh_token;

    // well-formed token, database unreachable
    let (status, body) = send(
        &app,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_signup_validation_happens_before_database() {
    let app = lazy_app();

    let (status, body) = send(
        &app,
        "POST",
        "/v1/auth/signup",
        None,
        Some(json!({
            "username": "gokul",
            "email": "gokul@example.org",
            "password": "plum-orbit-42",
            "password_confirmation": "different-42"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password_confirmation");
}

#[tokio::test]
async fn test_security_headers_on_rejections() {
    let mut app = lazy_app();
    let request = axum::http::Request::builder()
        .uri("/api/v1/task")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers().get("X-Content-Type-Options").unwrap(), "nosniff");
}
