// crates/roidota-api/src/server.rs
// ============================================================================
// Module: Roidota Control API Server
// Description: Manifest read and replace endpoints over HTTP.
// Purpose: Serve the control API on the configured bind address.
// Dependencies: axum, bytes, roidota-core, tokio, tracing
// ============================================================================

//! ## Overview
//! Routes `GET /manifest` to a snapshot read and `POST /manifest` to a
//! validated wholesale replacement. The replacement runs on a blocking thread
//! because it writes the manifest file.
//! Invariants:
//! - Bodies are validated completely before the store is touched.
//! - Every rejection, including an over-limit body, uses the JSON envelope.
//! - Accepted entries always fit one MQTT response packet.
//! - Concurrent replacements are last-writer-wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use bytes::Bytes;
use roidota_core::Manifest;
use roidota_core::ManifestStore;
use roidota_core::ResponseBudget;
use tokio::net::TcpListener;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::error::ApiError;
use crate::error::StatusBody;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state for control API handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Shared manifest store.
    store: ManifestStore,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
    /// Packet limit every response must fit.
    budget: ResponseBudget,
}

impl ApiState {
    /// Creates handler state over `store`.
    #[must_use]
    pub const fn new(store: ManifestStore, max_body_bytes: usize, budget: ResponseBudget) -> Self {
        Self {
            store,
            max_body_bytes,
            budget,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Builds the control API router.
#[must_use]
pub fn router(state: ApiState) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .route("/manifest", get(handle_get_manifest).post(handle_post_manifest))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(Arc::new(state))
}

/// Binds the control API listener.
///
/// # Errors
///
/// Returns [`ApiError::Bind`] when the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ApiError> {
    TcpListener::bind(addr).await.map_err(|err| ApiError::Bind {
        addr: addr.to_string(),
        reason: err.to_string(),
    })
}

/// Serves the control API on `listener` until the server fails.
///
/// # Errors
///
/// Returns [`ApiError::Serve`] when the server stops with an error.
pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), ApiError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "control api listening");
    }
    axum::serve(listener, router(state)).await.map_err(|err| ApiError::Serve(err.to_string()))
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Returns the full current mapping.
pub async fn handle_get_manifest(State(state): State<Arc<ApiState>>) -> Response {
    let snapshot = state.store.get_all();
    (StatusCode::OK, Json(Manifest::clone(&snapshot))).into_response()
}

/// Replaces the full mapping with the request body.
pub async fn handle_post_manifest(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => replace_manifest(&state, &body).await,
        Err(rejection) => Err(body_error(&state, &rejection)),
    };
    match result {
        Ok(entries) => {
            info!(entries, "manifest updated via control api");
            (StatusCode::OK, Json(StatusBody::success("Manifest updated."))).into_response()
        }
        Err(err) => {
            if err.status().is_server_error() {
                error!(error = %err, "manifest update failed");
            } else {
                warn!(error = %err, "manifest update rejected");
            }
            err.into_response()
        }
    }
}

/// Validates `body` and swaps it into the store; returns the entry count.
async fn replace_manifest(state: &ApiState, body: &[u8]) -> Result<usize, ApiError> {
    if body.len() > state.max_body_bytes {
        return Err(ApiError::TooLarge {
            max: state.max_body_bytes,
        });
    }
    let manifest = Manifest::from_json_slice(body)?;
    state.budget.check(&manifest)?;
    let entries = manifest.len();
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.replace(manifest))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(entries)
}

/// Maps a body extraction failure onto the API error envelope.
fn body_error(state: &ApiState, rejection: &BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge {
            max: state.max_body_bytes,
        }
    } else {
        ApiError::UnreadableBody(rejection.body_text())
    }
}
