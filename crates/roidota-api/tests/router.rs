// crates/roidota-api/tests/router.rs
// ============================================================================
// Module: Router Tests
// Description: Full request tests through the control API router.
// Purpose: Validate extraction, body limits, and routing as served.
// Dependencies: axum, roidota-api, roidota-core, serde_json, tempfile, tokio, tower
// ============================================================================

//! ## Overview
//! Sends complete HTTP requests through [`roidota_api::router`] so the body
//! limit layer and extractors run exactly as they do when served.

#![allow(dead_code, reason = "Common module may have unused helpers.")]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use roidota_api::router;
use serde_json::json;
use tower::ServiceExt;

use crate::common::TEST_BODY_LIMIT;
use crate::common::api_state_at;
use crate::common::json_body;
use crate::common::manifest_of;

/// Builds a JSON `POST /manifest` request.
fn post_manifest(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/manifest")
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request")
}

/// Tests a body over the limit is refused with the JSON error envelope.
#[tokio::test]
async fn oversized_body_returns_json_413() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("m.json");
    let (store, state) = api_state_at(&path, manifest_of(&[("dev-1", "fw-1.bin")]));

    let oversized = format!(r#"{{"dev-1":"{}"}}"#, "x".repeat(TEST_BODY_LIMIT));
    let response = router(state).oneshot(post_manifest(oversized)).await.expect("response");

    let body = json_body(response, StatusCode::PAYLOAD_TOO_LARGE).await;
    assert_eq!(
        body,
        json!({"status": "error", "message": format!("request body exceeds {TEST_BODY_LIMIT} bytes")})
    );
    assert_eq!(*store.get_all(), manifest_of(&[("dev-1", "fw-1.bin")]));
    assert!(!path.exists());
}

/// Tests a body at the limit reaches validation.
#[tokio::test]
async fn body_at_limit_is_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (store, state) = api_state_at(&dir.path().join("m.json"), manifest_of(&[]));

    let entry = r#"{"dev-1":"fw-1.bin"}"#;
    let padded = format!("{entry}{}", " ".repeat(TEST_BODY_LIMIT - entry.len()));
    let response = router(state).oneshot(post_manifest(padded)).await.expect("response");

    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["status"], "success");
    assert_eq!(*store.get_all(), manifest_of(&[("dev-1", "fw-1.bin")]));
}

/// Tests a post followed by a get through the router.
#[tokio::test]
async fn post_then_get_through_router() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_store, state) = api_state_at(&dir.path().join("m.json"), manifest_of(&[]));
    let app = router(state);

    let response =
        app.clone().oneshot(post_manifest(r#"{"dev-9":"fw-9.bin"}"#)).await.expect("response");
    assert_eq!(json_body(response, StatusCode::OK).await["status"], "success");

    let request = Request::builder().uri("/manifest").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(json_body(response, StatusCode::OK).await, json!({"dev-9": "fw-9.bin"}));
}

/// Tests a malformed body through the router keeps the JSON envelope.
#[tokio::test]
async fn malformed_body_returns_json_400() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (store, state) = api_state_at(&dir.path().join("m.json"), manifest_of(&[("dev-1", "a.bin")]));

    let response = router(state).oneshot(post_manifest("[1,2]")).await.expect("response");

    let body = json_body(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["status"], "error");
    assert_eq!(*store.get_all(), manifest_of(&[("dev-1", "a.bin")]));
}
