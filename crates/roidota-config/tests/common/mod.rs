// crates/roidota-config/tests/common/mod.rs
// ============================================================================
// Module: Common Config Test Utilities
// Description: Shared helpers for roidota-config tests.
// Purpose: Build configs from TOML and assert on validation messages.
// Dependencies: roidota-config
// ============================================================================

//! ## Overview
//! Provides config builders and assertion helpers.

use roidota_config::ConfigError;
use roidota_config::RoidotaConfig;

/// Result alias for string-reporting tests.
pub type TestResult = Result<(), String>;

/// Returns a config built from an empty TOML document.
pub fn minimal_config() -> Result<RoidotaConfig, ConfigError> {
    RoidotaConfig::from_toml_str("")
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
