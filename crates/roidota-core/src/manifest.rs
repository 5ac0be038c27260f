// crates/roidota-core/src/manifest.rs
// ============================================================================
// Module: Roidota Manifest
// Description: Device-to-firmware mapping and its JSON wire form.
// Purpose: Validate candidate mappings before they reach the shared store.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Manifest`] is the complete mapping from [`DeviceId`] to [`FirmwareRef`].
//! It is built fully and validated before it is published to readers, and is
//! replaced wholesale rather than edited in place.
//! Invariants:
//! - Keys are unique device identifiers.
//! - The JSON form is a flat object of strings with keys in sorted order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use thiserror::Error;

use crate::identifiers::DeviceId;
use crate::identifiers::FirmwareRef;
use crate::identifiers::IdentifierError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned when a candidate manifest is rejected.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A rejected candidate never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// Candidate was not valid JSON.
    #[error("manifest is not valid json: {0}")]
    Json(String),
    /// Candidate was valid JSON but not an object.
    #[error("Manifest must be a JSON object (got {found})")]
    NotAnObject {
        /// JSON type label of the rejected value.
        found: &'static str,
    },
    /// A manifest value was not a string.
    #[error("firmware reference for {device_id:?} must be a string (got {found})")]
    NonStringValue {
        /// Key whose value was rejected.
        device_id: String,
        /// JSON type label of the rejected value.
        found: &'static str,
    },
    /// A manifest key was not a valid device identifier.
    #[error("invalid device id {device_id:?}: {source}")]
    InvalidDeviceId {
        /// Rejected key.
        device_id: String,
        /// Underlying identifier error.
        source: IdentifierError,
    },
    /// A manifest value was not a valid firmware reference.
    #[error("invalid firmware reference for {device_id:?}: {source}")]
    InvalidFirmwareRef {
        /// Key whose value was rejected.
        device_id: String,
        /// Underlying identifier error.
        source: IdentifierError,
    },
    /// An entry's response would exceed the MQTT packet size limit.
    #[error("response for {device_id:?} needs {size} bytes, over the {max}-byte packet limit")]
    ResponseTooLarge {
        /// Key whose response is oversized.
        device_id: String,
        /// Encoded response packet size.
        size: usize,
        /// Maximum packet size.
        max: usize,
    },
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Complete device-to-firmware mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries keyed by device identifier.
    entries: HashMap<DeviceId, FirmwareRef>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes and validates a manifest from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the bytes are not a valid manifest object.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let value = serde_json::from_slice::<Value>(bytes)
            .map_err(|err| ManifestError::Json(err.to_string()))?;
        Self::from_json_value(value)
    }

    /// Validates a decoded JSON value as a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the value is not an object of strings or
    /// carries an invalid key.
    pub fn from_json_value(value: Value) -> Result<Self, ManifestError> {
        let Value::Object(object) = value else {
            return Err(ManifestError::NotAnObject {
                found: json_type_label(&value),
            });
        };
        let mut entries = HashMap::with_capacity(object.len());
        for (key, value) in object {
            let Value::String(raw_ref) = value else {
                return Err(ManifestError::NonStringValue {
                    found: json_type_label(&value),
                    device_id: key,
                });
            };
            let firmware =
                FirmwareRef::parse(raw_ref).map_err(|source| ManifestError::InvalidFirmwareRef {
                    device_id: key.clone(),
                    source,
                })?;
            let device = DeviceId::parse(key.as_str()).map_err(|source| {
                ManifestError::InvalidDeviceId {
                    device_id: key,
                    source,
                }
            })?;
            entries.insert(device, firmware);
        }
        Ok(Self {
            entries,
        })
    }

    /// Returns the firmware reference mapped to `device`.
    #[must_use]
    pub fn get(&self, device: &DeviceId) -> Option<&FirmwareRef> {
        self.entries.get(device)
    }

    /// Returns the number of mapped devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no devices are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries ordered by device identifier.
    #[must_use]
    pub fn sorted_entries(&self) -> BTreeMap<&DeviceId, &FirmwareRef> {
        self.entries.iter().collect()
    }

    /// Renders the manifest as pretty-printed JSON with sorted keys.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<(DeviceId, FirmwareRef)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (DeviceId, FirmwareRef)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.sorted_entries())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a stable label for a JSON value type.
const fn json_type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
