// crates/roidota-broker/src/mqtt.rs
// ============================================================================
// Module: Roidota MQTT Listener
// Description: MQTT event loop driving the resolution listener.
// Purpose: Keep the request subscription alive and dispatch each request.
// Dependencies: rumqttc, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`MqttListener`] owns the MQTT event loop. It subscribes to the request
//! topic after every accepted (re)connect, dispatches request publishes one at
//! a time, and waits `reconnect_delay_ms` after a transport failure before
//! polling again. The event loop reconnects on the next poll.
//! Invariants:
//! - Sessions are clean, so the subscription is reissued on every connect.
//! - Only publishes on the request topic are dispatched.
//! - A refused subscription is retried no sooner than `reconnect_delay_ms`.
//! - Responses over `max_packet_bytes` are refused before they reach the
//!   event loop, so one oversized entry cannot drop the connection.
//! - No event or failure ends [`MqttListener::run`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use roidota_config::MqttConfig;
use roidota_core::ManifestStore;
use rumqttc::AsyncClient;
use rumqttc::ConnectReturnCode;
use rumqttc::Event;
use rumqttc::EventLoop;
use rumqttc::MqttOptions;
use rumqttc::Packet;
use rumqttc::QoS;
use rumqttc::SubscribeReasonCode;
use thiserror::Error;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::listener::DispatchOutcome;
use crate::listener::ListenerEvent;
use crate::listener::ListenerState;
use crate::listener::ResolutionListener;
use crate::publisher::MqttPublisher;
use crate::topics::TopicScheme;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building the MQTT client.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// Connection settings cannot be used by the client.
    #[error("invalid mqtt options: {0}")]
    InvalidOptions(String),
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Builds client options from configuration.
///
/// # Errors
///
/// Returns [`ListenerError`] when the settings would be refused by the client.
pub fn mqtt_options(config: &MqttConfig) -> Result<MqttOptions, ListenerError> {
    if config.client_id.is_empty() {
        return Err(ListenerError::InvalidOptions("client id must be set".to_string()));
    }
    if config.host.is_empty() {
        return Err(ListenerError::InvalidOptions("host must be set".to_string()));
    }
    if config.keep_alive_secs == 0 {
        return Err(ListenerError::InvalidOptions("keep alive must be at least 1s".to_string()));
    }
    if config.channel_capacity == 0 {
        return Err(ListenerError::InvalidOptions("channel capacity must be non-zero".to_string()));
    }
    if config.max_packet_bytes == 0 {
        return Err(ListenerError::InvalidOptions("packet limit must be non-zero".to_string()));
    }
    let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_clean_session(true);
    options.set_max_packet_size(config.max_packet_bytes, config.max_packet_bytes);
    Ok(options)
}

// ============================================================================
// SECTION: MQTT Listener
// ============================================================================

/// Resolution listener bound to a live MQTT connection.
pub struct MqttListener {
    /// Client handle used for subscribing.
    client: AsyncClient,
    /// Event loop owning the connection.
    event_loop: EventLoop,
    /// Request dispatcher.
    listener: ResolutionListener<MqttPublisher>,
    /// Pause after a transport failure or refused subscription.
    reconnect_delay: Duration,
    /// Current lifecycle state.
    state: watch::Sender<ListenerState>,
    /// Whether the request subscription still needs to be queued.
    subscribe_pending: bool,
    /// Earliest time a refused subscription may be retried.
    subscribe_not_before: Option<Instant>,
}

impl MqttListener {
    /// Creates a listener; no connection is attempted until [`Self::run`].
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the client cannot be built.
    pub fn new(
        config: &MqttConfig,
        topics: TopicScheme,
        store: ManifestStore,
    ) -> Result<Self, ListenerError> {
        let (client, event_loop) = AsyncClient::new(mqtt_options(config)?, config.channel_capacity);
        let publisher = MqttPublisher::new(client.clone(), config.max_packet_bytes);
        let listener = ResolutionListener::new(store, topics, publisher);
        let (state, _) = watch::channel(ListenerState::Disconnected);
        Ok(Self {
            client,
            event_loop,
            listener,
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            state,
            subscribe_pending: false,
            subscribe_not_before: None,
        })
    }

    /// Returns a receiver observing lifecycle state changes.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    /// Drives the event loop for the lifetime of the process.
    pub async fn run(mut self) {
        loop {
            if *self.state.borrow() == ListenerState::Disconnected {
                self.transition(ListenerEvent::ConnectStarted);
            }
            match self.event_loop.poll().await {
                Ok(event) => {
                    let _outcome = self.handle_event(event);
                }
                Err(err) => {
                    warn!(error = %err, "mqtt transport failure");
                    self.transition(ListenerEvent::TransportFailed);
                    self.subscribe_pending = false;
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
            if self.subscription_due(Instant::now()) {
                self.queue_subscription();
            }
        }
    }

    /// Applies one event-loop event; returns the outcome of a dispatched request.
    fn handle_event(&mut self, event: Event) -> Option<DispatchOutcome> {
        let Event::Incoming(packet) = event else {
            return None;
        };
        match packet {
            Packet::ConnAck(ack) => {
                if ack.code == ConnectReturnCode::Success {
                    info!("mqtt connected");
                    self.transition(ListenerEvent::ConnectionAccepted);
                    self.subscribe_pending = true;
                    self.subscribe_not_before = None;
                } else {
                    error!(code = ?ack.code, "mqtt connection refused");
                }
                None
            }
            Packet::SubAck(ack) => {
                let accepted =
                    ack.return_codes.iter().all(|code| matches!(code, SubscribeReasonCode::Success(_)));
                if accepted {
                    info!(topic = self.listener.topics().request_topic(), "subscribed");
                    self.transition(ListenerEvent::SubscriptionAccepted);
                } else {
                    error!(
                        topic = self.listener.topics().request_topic(),
                        retry_ms = self.reconnect_delay.as_millis(),
                        "subscription refused"
                    );
                    self.subscribe_pending = true;
                    self.subscribe_not_before = Some(Instant::now() + self.reconnect_delay);
                }
                None
            }
            Packet::Publish(publish) => {
                if !self.listener.topics().is_request_topic(&publish.topic) {
                    return None;
                }
                self.transition(ListenerEvent::RequestReceived);
                let outcome = self.listener.dispatch(&publish.payload);
                self.transition(ListenerEvent::RequestFinished);
                Some(outcome)
            }
            _ => None,
        }
    }

    /// Returns true when the request subscription should be queued at `now`.
    fn subscription_due(&self, now: Instant) -> bool {
        self.subscribe_pending && self.subscribe_not_before.is_none_or(|at| now >= at)
    }

    /// Queues the request subscription without waiting on the event loop.
    fn queue_subscription(&mut self) {
        let topic = self.listener.topics().request_topic().to_string();
        match self.client.try_subscribe(topic, QoS::AtMostOnce) {
            Ok(()) => {
                self.subscribe_pending = false;
                self.subscribe_not_before = None;
            }
            Err(err) => warn!(error = %err, "request subscription deferred"),
        }
    }

    /// Advances the lifecycle state and logs changes.
    fn transition(&self, event: ListenerEvent) {
        self.state.send_if_modified(|state| {
            let next = state.next(event);
            if next == *state {
                return false;
            }
            info!(from = state.as_str(), to = next.as_str(), "listener state changed");
            *state = next;
            true
        });
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
