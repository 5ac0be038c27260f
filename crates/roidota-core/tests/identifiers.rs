// crates/roidota-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier Tests
// Description: Validation tests for device ids and firmware references.
// Purpose: Ensure topic-unsafe identifiers are rejected at construction.
// Dependencies: roidota-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises [`roidota_core::DeviceId`] and [`roidota_core::FirmwareRef`]
//! construction and serde behavior.

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

use roidota_core::DeviceId;
use roidota_core::FirmwareRef;
use roidota_core::IdentifierError;
use roidota_core::MAX_DEVICE_ID_BYTES;

// ============================================================================
// SECTION: Device Identifier Tests
// ============================================================================

/// Tests ordinary identifiers are accepted verbatim and case-sensitively.
#[test]
fn device_id_accepts_plain_identifiers() {
    let lower = DeviceId::parse("esp32-a1b2").expect("lower");
    let upper = DeviceId::parse("ESP32-A1B2").expect("upper");
    assert_eq!(lower.as_str(), "esp32-a1b2");
    assert_ne!(lower, upper);
}

/// Tests empty identifiers are rejected.
#[test]
fn device_id_rejects_empty() {
    assert_eq!(DeviceId::parse(""), Err(IdentifierError::Empty));
}

/// Tests topic separators and wildcards are rejected.
#[test]
fn device_id_rejects_topic_characters() {
    assert_eq!(DeviceId::parse("dev/1"), Err(IdentifierError::ReservedCharacter('/')));
    assert_eq!(DeviceId::parse("dev+"), Err(IdentifierError::ReservedCharacter('+')));
    assert_eq!(DeviceId::parse("#"), Err(IdentifierError::ReservedCharacter('#')));
}

/// Tests control characters, including NUL, are rejected.
#[test]
fn device_id_rejects_control_characters() {
    assert_eq!(DeviceId::parse("dev\u{0}1"), Err(IdentifierError::ControlCharacter));
    assert_eq!(DeviceId::parse("dev\t1"), Err(IdentifierError::ControlCharacter));
}

/// Tests surrounding whitespace is rejected since requests are trimmed.
#[test]
fn device_id_rejects_surrounding_whitespace() {
    assert_eq!(DeviceId::parse(" dev-1"), Err(IdentifierError::SurroundingWhitespace));
    assert_eq!(DeviceId::parse("dev-1\n"), Err(IdentifierError::SurroundingWhitespace));
    assert!(DeviceId::parse("dev 1").is_ok());
}

/// Tests the length limit boundary.
#[test]
fn device_id_enforces_length_limit() {
    let at_limit = "a".repeat(MAX_DEVICE_ID_BYTES);
    assert!(DeviceId::parse(at_limit).is_ok());
    let over = "a".repeat(MAX_DEVICE_ID_BYTES + 1);
    assert_eq!(
        DeviceId::parse(over),
        Err(IdentifierError::TooLong {
            max: MAX_DEVICE_ID_BYTES,
            actual: MAX_DEVICE_ID_BYTES + 1,
        })
    );
}

/// Tests deserialization applies the same validation.
#[test]
fn device_id_deserialize_validates() {
    let ok: DeviceId = serde_json::from_str("\"dev-1\"").expect("deserialize");
    assert_eq!(ok.as_str(), "dev-1");
    assert!(serde_json::from_str::<DeviceId>("\"dev/1\"").is_err());
}

// ============================================================================
// SECTION: Firmware Reference Tests
// ============================================================================

/// Tests firmware references are opaque but non-empty.
#[test]
fn firmware_ref_is_opaque_and_non_empty() {
    let reference = FirmwareRef::parse("builds/fw v2.bin").expect("reference");
    assert_eq!(reference.as_bytes(), b"builds/fw v2.bin");
    assert_eq!(FirmwareRef::parse(""), Err(IdentifierError::Empty));
}
