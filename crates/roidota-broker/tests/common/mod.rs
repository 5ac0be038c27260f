// crates/roidota-broker/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for roidota-broker tests.
// Purpose: Build stores, topic schemes, and recording publishers.
// Dependencies: roidota-broker, roidota-core, tokio
// ============================================================================

//! ## Overview
//! Provides a seeded store, the default topic scheme, and a channel-backed
//! listener whose published responses can be drained and inspected.

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

use roidota_broker::ChannelPublisher;
use roidota_broker::OutboundMessage;
use roidota_broker::ResolutionListener;
use roidota_broker::TopicScheme;
use roidota_core::DeviceId;
use roidota_core::FirmwareRef;
use roidota_core::Manifest;
use roidota_core::ManifestStore;
use tokio::sync::mpsc;

// ============================================================================
// SECTION: Fixtures
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

/// Creates an in-memory store seeded with `entries`.
pub fn store_of(entries: &[(&str, &str)]) -> ManifestStore {
    ManifestStore::with_manifest("unused_manifest.json", manifest_of(entries))
}

/// Returns the default request/response topic layout.
pub fn default_topics() -> TopicScheme {
    TopicScheme::new("roidota/request", "roidota/response/")
}

/// Creates a listener publishing into a bounded channel.
pub fn recording_listener(
    store: ManifestStore,
    capacity: usize,
) -> (ResolutionListener<ChannelPublisher>, mpsc::Receiver<OutboundMessage>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (ResolutionListener::new(store, default_topics(), ChannelPublisher::new(sender)), receiver)
}

/// Drains every message currently queued on `receiver`.
pub fn drain(receiver: &mut mpsc::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}
