// crates/roidota-core/src/identifiers.rs
// ============================================================================
// Module: Roidota Identifiers
// Description: Device identifiers and firmware references.
// Purpose: Provide validated, serializable identifiers with stable wire forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`DeviceId`] values double as the suffix of a device's private response
//! topic, so construction rejects anything that would change which topic a
//! response lands on. [`FirmwareRef`] values are opaque to the broker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum device identifier length in bytes.
pub const MAX_DEVICE_ID_BYTES: usize = 256;

/// Characters with topic-level meaning in MQTT.
const RESERVED_TOPIC_CHARS: [char; 3] = ['/', '+', '#'];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned when constructing identifiers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier exceeded the maximum length.
    #[error("identifier exceeds {max} bytes (got {actual})")]
    TooLong {
        /// Maximum allowed length in bytes.
        max: usize,
        /// Actual length in bytes.
        actual: usize,
    },
    /// Identifier carried leading or trailing whitespace.
    #[error("identifier must not have surrounding whitespace")]
    SurroundingWhitespace,
    /// Identifier contained a topic separator or wildcard.
    #[error("identifier contains reserved topic character {0:?}")]
    ReservedCharacter(char),
    /// Identifier contained a control character.
    #[error("identifier contains a control character")]
    ControlCharacter,
}

// ============================================================================
// SECTION: Device Identifier
// ============================================================================

/// Opaque, case-sensitive device identifier.
///
/// # Invariants
/// - Non-empty, at most [`MAX_DEVICE_ID_BYTES`] bytes.
/// - Contains no `/`, `+`, `#`, or control characters.
/// - Has no leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Parses a device identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value violates the identifier invariants.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if raw.len() > MAX_DEVICE_ID_BYTES {
            return Err(IdentifierError::TooLong {
                max: MAX_DEVICE_ID_BYTES,
                actual: raw.len(),
            });
        }
        if raw.trim() != raw {
            return Err(IdentifierError::SurroundingWhitespace);
        }
        for ch in raw.chars() {
            if RESERVED_TOPIC_CHARS.contains(&ch) {
                return Err(IdentifierError::ReservedCharacter(ch));
            }
            if ch.is_control() {
                return Err(IdentifierError::ControlCharacter);
            }
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DeviceId> for String {
    fn from(value: DeviceId) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Firmware Reference
// ============================================================================

/// Opaque firmware artifact reference (filename, version string, ...).
///
/// # Invariants
/// - Non-empty; otherwise uninterpreted by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FirmwareRef(String);

impl FirmwareRef {
    /// Creates a firmware reference.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Empty`] when the value is empty.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentifierError::Empty);
        }
        Ok(Self(raw))
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the reference as raw UTF-8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for FirmwareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for FirmwareRef {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FirmwareRef> for String {
    fn from(value: FirmwareRef) -> Self {
        value.0
    }
}
