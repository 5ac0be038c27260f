// crates/roidota-broker/src/publisher/mqtt.rs
// ============================================================================
// Module: Roidota MQTT Publisher
// Description: Publisher backed by the MQTT client request queue.
// Purpose: Publish responses at QoS 0 without awaiting the event loop.
// Dependencies: roidota-core, rumqttc
// ============================================================================

//! ## Overview
//! [`MqttPublisher`] uses `try_publish` so the listener loop, which is also
//! the task polling the MQTT event loop, never waits on its own queue.
//! Messages over the packet limit are refused here; the event loop would
//! otherwise drop the whole connection on them.

use roidota_core::publish_packet_bytes;
use rumqttc::AsyncClient;
use rumqttc::QoS;

use crate::handler::OutboundMessage;
use crate::publisher::PublishError;
use crate::publisher::Publisher;

/// MQTT response publisher.
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    /// Client handle feeding the event loop.
    client: AsyncClient,
    /// Largest packet the client will send.
    max_packet_bytes: usize,
}

impl MqttPublisher {
    /// Creates a publisher over an MQTT client handle.
    #[must_use]
    pub const fn new(client: AsyncClient, max_packet_bytes: usize) -> Self {
        Self {
            client,
            max_packet_bytes,
        }
    }
}

impl Publisher for MqttPublisher {
    fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        let size = publish_packet_bytes(message.topic.len(), message.payload().len());
        if size > self.max_packet_bytes {
            return Err(PublishError::TooLarge {
                size,
                max: self.max_packet_bytes,
            });
        }
        self.client
            .try_publish(message.topic.as_str(), QoS::AtMostOnce, false, message.payload().to_vec())
            .map_err(|err| PublishError::Rejected(err.to_string()))
    }
}
