// crates/roidota-broker/src/publisher/channel.rs
// ============================================================================
// Module: Roidota Channel Publisher
// Description: Channel-based publisher for in-process delivery.
// Purpose: Send outbound responses through a Tokio mpsc channel.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! [`ChannelPublisher`] delivers responses by sending them into a
//! `tokio::sync::mpsc` channel, for embedding the listener or observing it.
//! Invariants:
//! - Successful publishes enqueue exactly one message.

use tokio::sync::mpsc::Sender;

use crate::handler::OutboundMessage;
use crate::publisher::PublishError;
use crate::publisher::Publisher;

/// Channel-based response publisher.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    /// Sender used to deliver messages.
    sender: Sender<OutboundMessage>,
}

impl ChannelPublisher {
    /// Creates a channel publisher.
    #[must_use]
    pub const fn new(sender: Sender<OutboundMessage>) -> Self {
        Self {
            sender,
        }
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        self.sender.try_send(message.clone()).map_err(|err| PublishError::Rejected(err.to_string()))
    }
}
