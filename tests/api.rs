//! Router tests that are rejected before any handler touches the database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use urban_reports::{build_app, AppState};
use uuid::Uuid;

fn app() -> (Router, AppState) {
    let state = AppState::fake();
    (build_app(state.clone()), state)
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app();
    let res = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn profile_requires_bearer_token() {
    let (app, _) = app();
    let res = app
        .oneshot(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn preference_toggle_rejects_garbage_token() {
    let (app, _) = app();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/me/dark-mode")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn vote_rejects_refresh_token() {
    let (app, state) = app();
    let refresh = state.jwt.sign_refresh(Uuid::new_v4()).unwrap();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/reports/{}/vote", Uuid::new_v4()))
                .header(header::AUTHORIZATION, format!("Bearer {}", refresh))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"direction":"up"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn vote_with_unknown_direction_is_rejected_before_the_service() {
    let (app, state) = app();
    let access = state.jwt.sign_access(Uuid::new_v4()).unwrap();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/reports/{}/vote", Uuid::new_v4()))
                .header(header::AUTHORIZATION, format!("Bearer {}", access))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"direction":"sideways"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(res.status().is_client_error());
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_report_id_is_bad_request() {
    let (app, _) = app();
    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/reports/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creating_a_report_needs_identity() {
    let (app, _) = app();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reports")
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
                .body(Body::from("--x--\r\n"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
