// crates/roidota-api/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for roidota-api tests.
// Purpose: Build handler state and decode JSON responses.
// Dependencies: axum, roidota-api, roidota-core, serde_json
// ============================================================================

//! ## Overview
//! Provides store-backed handler state and response body helpers.

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

use std::path::Path;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use roidota_api::ApiState;
use roidota_core::DeviceId;
use roidota_core::FirmwareRef;
use roidota_core::Manifest;
use roidota_core::ManifestStore;
use roidota_core::ResponseBudget;
use serde_json::Value;

/// Body limit used by test state.
pub const TEST_BODY_LIMIT: usize = 1024;

/// MQTT packet limit used by test state.
pub const TEST_PACKET_LIMIT: usize = 256;

/// Response prefix used by test state.
pub const TEST_RESPONSE_PREFIX: &str = "roidota/response/";

/// Builds a manifest from `(device, firmware)` pairs.
pub fn manifest_of(entries: &[(&str, &str)]) -> Manifest {
    entries
        .iter()
        .map(|(device, firmware)| {
            (
                DeviceId::parse(*device).expect("valid device id"),
                FirmwareRef::parse(*firmware).expect("valid firmware ref"),
            )
        })
        .collect()
}

/// Builds API state over a store persisting to `path`.
pub fn api_state_at(path: &Path, manifest: Manifest) -> (ManifestStore, ApiState) {
    let store = ManifestStore::with_manifest(path, manifest);
    let budget = ResponseBudget::new(TEST_RESPONSE_PREFIX, TEST_PACKET_LIMIT);
    (store.clone(), ApiState::new(store, TEST_BODY_LIMIT, budget))
}

/// Creates handler state over a store persisting to `path`.
pub fn state_at(path: &Path, manifest: Manifest) -> (ManifestStore, State<Arc<ApiState>>) {
    let (store, state) = api_state_at(path, manifest);
    (store, State(Arc::new(state)))
}

/// Asserts the status and JSON content type, then decodes the body.
pub async fn json_body(response: Response, expected: StatusCode) -> Value {
    assert_eq!(response.status(), expected);
    let content_type = response.headers().get(CONTENT_TYPE).expect("content type");
    assert_eq!(content_type, "application/json");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
