// crates/roidota-broker/src/lib.rs
// ============================================================================
// Module: Roidota Broker Library
// Description: Resolution listener bridging MQTT requests to the manifest.
// Purpose: Answer device firmware requests on per-device response topics.
// Dependencies: roidota-core, roidota-config, rumqttc, thiserror, tokio
// ============================================================================

//! ## Overview
//! The broker turns a request message carrying a [`roidota_core::DeviceId`]
//! into a response message carrying the mapped
//! [`roidota_core::FirmwareRef`]. [`handle_request`] is the pure resolution
//! step, [`ResolutionListener`] adds delivery and failure containment, and
//! [`MqttListener`] drives it from a live MQTT connection.
//! Invariants:
//! - A mapped request yields exactly one publish on `prefix + device_id`.
//! - Unmapped or malformed requests yield no publish.
//! - No per-message failure stops the listener loop.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod handler;
pub mod listener;
pub mod mqtt;
pub mod publisher;
pub mod topics;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use handler::OutboundMessage;
pub use handler::RequestError;
pub use handler::Resolution;
pub use handler::handle_request;
pub use listener::DispatchOutcome;
pub use listener::ListenerEvent;
pub use listener::ListenerState;
pub use listener::ResolutionListener;
pub use mqtt::ListenerError;
pub use mqtt::MqttListener;
pub use mqtt::mqtt_options;
pub use publisher::ChannelPublisher;
pub use publisher::MqttPublisher;
pub use publisher::PublishError;
pub use publisher::Publisher;
pub use topics::TopicScheme;
