// crates/roidota-api/src/lib.rs
// ============================================================================
// Module: Roidota API Library
// Description: HTTP control surface for the firmware manifest.
// Purpose: Read and replace the shared manifest over HTTP.
// Dependencies: axum, roidota-core, tokio
// ============================================================================

//! ## Overview
//! The control API exposes `GET /manifest` and `POST /manifest` over the same
//! [`roidota_core::ManifestStore`] handle the resolution listener reads.
//! Invariants:
//! - A rejected body never changes the mapping.
//! - Every error response carries `{"status":"error","message":...}`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ApiError;
pub use error::StatusBody;
pub use server::ApiState;
pub use server::bind;
pub use server::handle_get_manifest;
pub use server::handle_post_manifest;
pub use server::router;
pub use server::serve;
