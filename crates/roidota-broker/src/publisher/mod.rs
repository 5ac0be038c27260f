// crates/roidota-broker/src/publisher/mod.rs
// ============================================================================
// Module: Roidota Publishers
// Description: Publisher trait and implementations for response delivery.
// Purpose: Deliver outbound responses without blocking the listener loop.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Publishers enqueue [`crate::OutboundMessage`] values for delivery. Delivery
//! is fire-and-forget: a successful return means the message was accepted for
//! sending, not that a device received it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::handler::OutboundMessage;

// ============================================================================
// SECTION: Publish Errors
// ============================================================================

/// Errors emitted by publishers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Transport refused to accept the message.
    #[error("publish rejected: {0}")]
    Rejected(String),
    /// Encoded message exceeds the transport packet limit.
    #[error("response packet of {size} bytes exceeds the {max}-byte limit")]
    TooLarge {
        /// Encoded packet size.
        size: usize,
        /// Maximum packet size.
        max: usize,
    },
}

// ============================================================================
// SECTION: Publisher Trait
// ============================================================================

/// Enqueues outbound responses.
pub trait Publisher: Send + Sync {
    /// Publishes `message` without waiting on the transport.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the message cannot be enqueued.
    fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError>;
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod channel;
pub mod mqtt;

pub use channel::ChannelPublisher;
pub use mqtt::MqttPublisher;
