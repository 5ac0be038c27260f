// crates/roidota-api/src/error.rs
// ============================================================================
// Module: Roidota API Errors
// Description: Control API failures and their HTTP responses.
// Purpose: Map store and transport failures onto status codes and bodies.
// Dependencies: axum, roidota-core, serde, thiserror
// ============================================================================

//! ## Overview
//! [`ApiError`] is both the error type of the control API and its error
//! response. Unreadable bodies and shape failures map to 400, oversized
//! bodies to 413, and persistence or internal failures to 500.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use roidota_core::ManifestError;
use roidota_core::PersistenceError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Response Body
// ============================================================================

/// Status envelope returned by `POST /manifest` and by every error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    /// `success` or `error`.
    pub status: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl StatusBody {
    /// Builds a success envelope.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    /// Builds an error envelope.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Control API errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body exceeded the configured limit.
    #[error("request body exceeds {max} bytes")]
    TooLarge {
        /// Maximum accepted body size.
        max: usize,
    },
    /// Request body could not be read.
    #[error("request body could not be read: {0}")]
    UnreadableBody(String),
    /// Request body was not a valid manifest.
    #[error(transparent)]
    InvalidManifest(#[from] ManifestError),
    /// Manifest was replaced in memory but could not be saved.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// Replacement task failed to complete.
    #[error("manifest replacement failed: {0}")]
    Internal(String),
    /// Listener address could not be bound.
    #[error("control api bind failed on {addr}: {reason}")]
    Bind {
        /// Requested bind address.
        addr: String,
        /// I/O failure detail.
        reason: String,
    },
    /// HTTP server stopped with an error.
    #[error("control api server failed: {0}")]
    Serve(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge {
                ..
            } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnreadableBody(_) | Self::InvalidManifest(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(_)
            | Self::Internal(_)
            | Self::Bind {
                ..
            }
            | Self::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(StatusBody::error(self.to_string()))).into_response()
    }
}
