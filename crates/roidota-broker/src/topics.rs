// crates/roidota-broker/src/topics.rs
// ============================================================================
// Module: Roidota Topic Scheme
// Description: Request topic and per-device response topic layout.
// Purpose: Derive response topics from validated device identifiers.
// Dependencies: roidota-config, roidota-core
// ============================================================================

//! ## Overview
//! Response topics are the configured prefix joined verbatim with the device
//! identifier. [`roidota_core::DeviceId`] excludes separators and wildcards,
//! so the join always lands on the device's own topic.

use roidota_config::TopicsConfig;
use roidota_core::DeviceId;

/// Request/response topic layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScheme {
    /// Topic devices publish requests to.
    request: String,
    /// Prefix for per-device response topics.
    response_prefix: String,
}

impl TopicScheme {
    /// Creates a topic scheme from a request topic and response prefix.
    #[must_use]
    pub fn new(request: impl Into<String>, response_prefix: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            response_prefix: response_prefix.into(),
        }
    }

    /// Creates a topic scheme from validated configuration.
    #[must_use]
    pub fn from_config(config: &TopicsConfig) -> Self {
        Self::new(config.request.clone(), config.response_prefix.clone())
    }

    /// Returns the request topic.
    #[must_use]
    pub fn request_topic(&self) -> &str {
        &self.request
    }

    /// Returns true when `topic` is the request topic.
    #[must_use]
    pub fn is_request_topic(&self, topic: &str) -> bool {
        topic == self.request
    }

    /// Returns the response topic for `device`.
    #[must_use]
    pub fn response_topic(&self, device: &DeviceId) -> String {
        let mut topic = String::with_capacity(self.response_prefix.len() + device.as_str().len());
        topic.push_str(&self.response_prefix);
        topic.push_str(device.as_str());
        topic
    }
}
