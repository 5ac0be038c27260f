// crates/roidota-broker/src/listener.rs
// ============================================================================
// Module: Roidota Resolution Listener
// Description: Request dispatch with failure containment and lifecycle state.
// Purpose: Resolve each inbound request and publish its response, if any.
// Dependencies: roidota-core, tracing
// ============================================================================

//! ## Overview
//! [`ResolutionListener`] wraps [`crate::handle_request`] with delivery through
//! a [`Publisher`]. Every outcome, including failures, is returned as a
//! [`DispatchOutcome`] and logged; nothing propagates to the caller's loop.
//! [`ListenerState`] tracks the connection lifecycle:
//! `Disconnected -> Connecting -> Subscribed -> Handling -> Subscribed`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roidota_core::DeviceId;
use roidota_core::ManifestStore;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::handler::OutboundMessage;
use crate::handler::RequestError;
use crate::handler::Resolution;
use crate::handler::handle_request;
use crate::publisher::PublishError;
use crate::publisher::Publisher;
use crate::topics::TopicScheme;

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// Listener connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerState {
    /// No transport connection.
    #[default]
    Disconnected,
    /// Connecting, or connected with the request subscription pending.
    Connecting,
    /// Subscribed to the request topic and idle.
    Subscribed,
    /// Handling one inbound request.
    Handling,
}

/// Transport events that drive [`ListenerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerEvent {
    /// The event loop is about to (re)connect.
    ConnectStarted,
    /// The broker accepted the connection.
    ConnectionAccepted,
    /// The broker acknowledged the request subscription.
    SubscriptionAccepted,
    /// A request arrived on the request topic.
    RequestReceived,
    /// The current request finished, successfully or not.
    RequestFinished,
    /// The transport connection failed.
    TransportFailed,
}

impl ListenerState {
    /// Returns the state after `event`.
    #[must_use]
    pub const fn next(self, event: ListenerEvent) -> Self {
        match (self, event) {
            (_, ListenerEvent::TransportFailed) => Self::Disconnected,
            (Self::Disconnected, ListenerEvent::ConnectStarted)
            | (_, ListenerEvent::ConnectionAccepted) => Self::Connecting,
            (Self::Connecting, ListenerEvent::SubscriptionAccepted)
            | (Self::Handling, ListenerEvent::RequestFinished) => Self::Subscribed,
            (Self::Subscribed, ListenerEvent::RequestReceived) => Self::Handling,
            (state, _) => state,
        }
    }

    /// Returns a stable label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
            Self::Handling => "handling",
        }
    }
}

// ============================================================================
// SECTION: Dispatch Outcome
// ============================================================================

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Response was accepted for publishing.
    Published(OutboundMessage),
    /// Device is not mapped; nothing was published.
    Unmapped(DeviceId),
    /// Payload was malformed; nothing was published.
    Malformed(RequestError),
    /// Response could not be published.
    PublishFailed {
        /// Response that failed.
        message: OutboundMessage,
        /// Publisher failure.
        error: PublishError,
    },
}

// ============================================================================
// SECTION: Resolution Listener
// ============================================================================

/// Resolves requests against the shared store and publishes responses.
///
/// # Invariants
/// - The store handle is shared with the control API, never copied.
#[derive(Debug, Clone)]
pub struct ResolutionListener<P> {
    /// Shared manifest store.
    store: ManifestStore,
    /// Topic layout.
    topics: TopicScheme,
    /// Response publisher.
    publisher: P,
}

impl<P: Publisher> ResolutionListener<P> {
    /// Creates a listener over `store`.
    #[must_use]
    pub const fn new(store: ManifestStore, topics: TopicScheme, publisher: P) -> Self {
        Self {
            store,
            topics,
            publisher,
        }
    }

    /// Returns the topic layout.
    #[must_use]
    pub const fn topics(&self) -> &TopicScheme {
        &self.topics
    }

    /// Dispatches one raw request payload.
    pub fn dispatch(&self, payload: &[u8]) -> DispatchOutcome {
        let outcome = match handle_request(payload, &self.store, &self.topics) {
            Ok(Resolution::Mapped(message)) => match self.publisher.publish(&message) {
                Ok(()) => DispatchOutcome::Published(message),
                Err(error) => DispatchOutcome::PublishFailed {
                    message,
                    error,
                },
            },
            Ok(Resolution::Unmapped(device)) => DispatchOutcome::Unmapped(device),
            Err(err) => DispatchOutcome::Malformed(err),
        };
        log_outcome(&outcome);
        outcome
    }
}

/// Emits the log line for a dispatch outcome.
fn log_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Published(message) => info!(
            device = %message.device,
            firmware = %message.firmware,
            topic = %message.topic,
            "sent firmware reference"
        ),
        DispatchOutcome::Unmapped(device) => warn!(device = %device, "no firmware mapped"),
        DispatchOutcome::Malformed(err) => warn!(error = %err, "dropped request"),
        DispatchOutcome::PublishFailed {
            message,
            error,
        } => error!(device = %message.device, error = %error, "failed to publish response"),
    }
}
