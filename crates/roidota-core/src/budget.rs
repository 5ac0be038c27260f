// crates/roidota-core/src/budget.rs
// ============================================================================
// Module: Roidota Response Budget
// Description: Size limit for the response a manifest entry produces.
// Purpose: Keep every mapped response within the MQTT packet size limit.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A response is one QoS 0 MQTT publish on `response_prefix + device_id`
//! carrying the firmware reference. [`publish_packet_bytes`] computes its
//! encoded size; [`ResponseBudget`] rejects manifests containing an entry
//! whose response would exceed the configured packet limit.
//! Invariants:
//! - Sizes match the MQTT 3.1.1 encoding of a QoS 0 publish.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::manifest::Manifest;
use crate::manifest::ManifestError;

// ============================================================================
// SECTION: Packet Size
// ============================================================================

/// Returns the encoded size of a QoS 0 publish with the given topic and payload.
#[must_use]
pub const fn publish_packet_bytes(topic_bytes: usize, payload_bytes: usize) -> usize {
    let remaining = 2 + topic_bytes + payload_bytes;
    let remaining_length_bytes = if remaining < 128 {
        1
    } else if remaining < 16_384 {
        2
    } else if remaining < 2_097_152 {
        3
    } else {
        4
    };
    1 + remaining_length_bytes + remaining
}

// ============================================================================
// SECTION: Response Budget
// ============================================================================

/// Packet size limit applied to every mapped response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBudget {
    /// Response topic prefix in bytes.
    prefix_bytes: usize,
    /// Maximum encoded packet size.
    max_packet_bytes: usize,
}

impl ResponseBudget {
    /// Creates a budget for responses under `response_prefix`.
    #[must_use]
    pub const fn new(response_prefix: &str, max_packet_bytes: usize) -> Self {
        Self {
            prefix_bytes: response_prefix.len(),
            max_packet_bytes,
        }
    }

    /// Returns the maximum encoded packet size.
    #[must_use]
    pub const fn max_packet_bytes(&self) -> usize {
        self.max_packet_bytes
    }

    /// Checks that every entry's response fits the packet limit.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::ResponseTooLarge`] for the first oversized
    /// entry in device identifier order.
    pub fn check(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        for (device, firmware) in manifest.sorted_entries() {
            let size = publish_packet_bytes(
                self.prefix_bytes + device.as_str().len(),
                firmware.as_bytes().len(),
            );
            if size > self.max_packet_bytes {
                return Err(ManifestError::ResponseTooLarge {
                    device_id: device.to_string(),
                    size,
                    max: self.max_packet_bytes,
                });
            }
        }
        Ok(())
    }
}
