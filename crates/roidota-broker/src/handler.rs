// crates/roidota-broker/src/handler.rs
// ============================================================================
// Module: Roidota Request Handler
// Description: Pure resolution of a request payload against the manifest.
// Purpose: Map raw request bytes to an optional outbound response.
// Dependencies: roidota-core, thiserror
// ============================================================================

//! ## Overview
//! [`handle_request`] decodes a request payload, resolves it against the
//! shared [`ManifestStore`], and describes the response to send. It performs
//! no I/O, so it can run inside the listener loop without blocking.
//! Invariants:
//! - Payloads are decoded as UTF-8 and trimmed before parsing.
//! - Malformed payloads never produce an outbound message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roidota_core::DeviceId;
use roidota_core::FirmwareRef;
use roidota_core::IdentifierError;
use roidota_core::ManifestStore;
use thiserror::Error;

use crate::topics::TopicScheme;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed request payloads.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Payload was not valid UTF-8.
    #[error("malformed request: payload is not utf-8")]
    NotUtf8,
    /// Payload did not carry a valid device identifier.
    #[error("malformed request: {0}")]
    InvalidDeviceId(#[from] IdentifierError),
}

// ============================================================================
// SECTION: Resolution Types
// ============================================================================

/// Response to publish for a resolved request.
///
/// # Invariants
/// - `topic` is the response topic derived from `device`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Requesting device.
    pub device: DeviceId,
    /// Response topic.
    pub topic: String,
    /// Firmware reference carried as the payload.
    pub firmware: FirmwareRef,
}

impl OutboundMessage {
    /// Returns the raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.firmware.as_bytes()
    }
}

/// Result of resolving a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Device is mapped; publish the message.
    Mapped(OutboundMessage),
    /// Device is not mapped; stay silent.
    Unmapped(DeviceId),
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Resolves a raw request payload.
///
/// # Errors
///
/// Returns [`RequestError`] when the payload is not a valid device identifier.
pub fn handle_request(
    payload: &[u8],
    store: &ManifestStore,
    topics: &TopicScheme,
) -> Result<Resolution, RequestError> {
    let text = std::str::from_utf8(payload).map_err(|_| RequestError::NotUtf8)?;
    let device = DeviceId::parse(text.trim())?;
    Ok(match store.resolve(&device) {
        Some(firmware) => Resolution::Mapped(OutboundMessage {
            topic: topics.response_topic(&device),
            device,
            firmware,
        }),
        None => Resolution::Unmapped(device),
    })
}
