// crates/roidota-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for roidota-core tests.
// Purpose: Build manifests and temporary manifest paths.
// Dependencies: roidota-core, tempfile
// ============================================================================

//! ## Overview
//! Provides shared manifest builders and filesystem fixtures.

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

use std::path::PathBuf;

use roidota_core::DeviceId;
use roidota_core::FirmwareRef;
use roidota_core::Manifest;
use tempfile::TempDir;

// ============================================================================
// SECTION: Manifest Helpers
// ============================================================================

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

/// Parses a device identifier for lookups.
pub fn device(raw: &str) -> DeviceId {
    DeviceId::parse(raw).expect("valid device id")
}

// ============================================================================
// SECTION: Filesystem Helpers
// ============================================================================

/// Creates a temporary directory and the manifest path inside it.
pub fn temp_manifest_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("firmware_manifest.json");
    (dir, path)
}
