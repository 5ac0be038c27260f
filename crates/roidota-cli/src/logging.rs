// crates/roidota-cli/src/logging.rs
// ============================================================================
// Module: Roidota Logging
// Description: Process-wide tracing subscriber setup.
// Purpose: Route structured log events to stderr with a configurable filter.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Installs a `fmt` subscriber writing to stderr. `RUST_LOG` takes precedence
//! over the configured `[logging].filter` directive.

use tracing_subscriber::EnvFilter;

use crate::runtime::RuntimeError;

/// Installs the global subscriber using `default_filter` when `RUST_LOG` is unset.
pub(crate) fn init_logging(default_filter: &str) -> Result<(), RuntimeError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|err| RuntimeError::Logging(format!("invalid log filter: {err}")))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| RuntimeError::Logging(err.to_string()))
}
