// crates/roidota-core/src/lib.rs
// ============================================================================
// Module: Roidota Core Library
// Description: Device identifiers, firmware manifests, and the shared store.
// Purpose: Own the device-to-firmware mapping and its persisted file.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Roidota Core defines the [`Manifest`] mapping from [`DeviceId`] to
//! [`FirmwareRef`] and the [`ManifestStore`] that both ingress paths share.
//! Invariants:
//! - Readers observe a manifest entirely before or entirely after a replacement.
//! - Device identifiers are safe to append to an MQTT topic prefix.
//! - The persisted file is a flat JSON object of strings.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod budget;
pub mod identifiers;
pub mod manifest;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use budget::ResponseBudget;
pub use budget::publish_packet_bytes;
pub use identifiers::DeviceId;
pub use identifiers::FirmwareRef;
pub use identifiers::IdentifierError;
pub use identifiers::MAX_DEVICE_ID_BYTES;
pub use manifest::Manifest;
pub use manifest::ManifestError;
pub use store::MAX_MANIFEST_FILE_BYTES;
pub use store::ManifestStore;
pub use store::PersistenceError;
pub use store::PersistenceWarning;
pub use store::read_manifest_file;
pub use store::write_manifest_file;
