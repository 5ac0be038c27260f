// crates/roidota-cli/src/runtime.rs
// ============================================================================
// Module: Roidota Broker Runtime
// Description: Process wiring for the store, listener, and control API.
// Purpose: Run the resolution listener and control API over one store.
// Dependencies: roidota-api, roidota-broker, roidota-config, roidota-core, tokio
// ============================================================================

//! ## Overview
//! Startup order is fixed: load the store (degrading to empty on failure),
//! spawn the MQTT listener task, then bind and serve the control API on the
//! calling task. There is no graceful drain.
//! Invariants:
//! - The listener and the control API share one [`ManifestStore`] handle.
//! - A client build or bind failure ends the process with an error.
//! - A loaded entry over the packet limit is logged at startup; requests for
//!   it fail to publish while the connection stays up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roidota_api::ApiError;
use roidota_api::ApiState;
use roidota_broker::ListenerError;
use roidota_broker::MqttListener;
use roidota_broker::TopicScheme;
use roidota_config::ConfigError;
use roidota_config::RoidotaConfig;
use roidota_core::ManifestStore;
use roidota_core::ResponseBudget;
use thiserror::Error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal runtime failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub(crate) enum RuntimeError {
    /// Configuration could not be loaded or was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Logging could not be initialized.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// MQTT client could not be built.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// Control API could not bind or stopped.
    #[error(transparent)]
    Api(#[from] ApiError),
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Runs the broker until the control API stops.
pub(crate) async fn run_broker(config: RoidotaConfig) -> Result<(), RuntimeError> {
    let (store, _warning) = ManifestStore::load(&config.manifest.path);
    let budget = ResponseBudget::new(&config.topics.response_prefix, config.mqtt.max_packet_bytes);
    if let Err(err) = budget.check(&store.get_all()) {
        warn!(error = %err, "loaded manifest has an entry over the packet limit");
    }
    let topics = TopicScheme::from_config(&config.topics);
    let listener = MqttListener::new(&config.mqtt, topics, store.clone())?;
    info!(
        host = %config.mqtt.host,
        port = config.mqtt.port,
        request_topic = %config.topics.request,
        "starting resolution listener"
    );
    let _listener_task = tokio::spawn(listener.run());

    let addr = config.http.socket_addr()?;
    let tcp = roidota_api::bind(addr).await?;
    roidota_api::serve(tcp, ApiState::new(store, config.http.max_body_bytes, budget)).await?;
    Ok(())
}
