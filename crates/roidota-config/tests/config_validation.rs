//! Config defaults and validation tests for roidota-config.
// crates/roidota-config/tests/config_validation.rs
// =============================================================================
// Module: Config Defaults and Validation Tests
// Description: Validate default behavior and config invariants.
// Purpose: Ensure an empty config is usable and unsafe topics are rejected.
// =============================================================================

#![allow(dead_code, reason = "Common module may have unused helpers.")]

use std::fs;
use std::path::PathBuf;

use roidota_config::MqttConfig;
use roidota_config::RoidotaConfig;
use roidota_config::TopicsConfig;

mod common;

use crate::common::TestResult;
use crate::common::assert_invalid;
use crate::common::minimal_config;

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = minimal_config().map_err(|err| err.to_string())?;
    if config.topics.request != "roidota/request" {
        return Err(format!("unexpected request topic {}", config.topics.request));
    }
    if config.topics.response_prefix != "roidota/response/" {
        return Err(format!("unexpected response prefix {}", config.topics.response_prefix));
    }
    if config.mqtt.port != 1883 || config.mqtt.host != "localhost" {
        return Err("unexpected mqtt defaults".to_string());
    }
    if config.manifest.path != PathBuf::from("firmware_manifest.json") {
        return Err("unexpected manifest path".to_string());
    }
    let addr = config.http.socket_addr().map_err(|err| err.to_string())?;
    if addr.port() != 5000 {
        return Err(format!("unexpected bind port {}", addr.port()));
    }
    if !addr.ip().is_loopback() {
        return Err(format!("default bind should be loopback, got {addr}"));
    }
    if config.mqtt.max_packet_bytes != 10 * 1024 {
        return Err(format!("unexpected packet limit {}", config.mqtt.max_packet_bytes));
    }
    Ok(())
}

#[test]
fn partial_sections_keep_remaining_defaults() -> TestResult {
    let config = RoidotaConfig::from_toml_str(
        r#"
[mqtt]
host = "broker.local"

[http]
bind = "0.0.0.0:8080"
"#,
    )
    .map_err(|err| err.to_string())?;
    if config.mqtt.host != "broker.local" || config.mqtt.port != 1883 {
        return Err("mqtt section did not merge with defaults".to_string());
    }
    if config.http.max_body_bytes != 1024 * 1024 {
        return Err("http.max_body_bytes lost its default".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn wildcard_topics_are_rejected() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.topics = TopicsConfig {
        request: "roidota/+/request".to_string(),
        response_prefix: "roidota/response/".to_string(),
    };
    assert_invalid(config.validate(), "topics.request must not contain wildcards")?;
    config.topics = TopicsConfig {
        request: "roidota/request".to_string(),
        response_prefix: "roidota/#".to_string(),
    };
    assert_invalid(config.validate(), "topics.response_prefix must not contain wildcards")
}

#[test]
fn request_topic_under_response_prefix_is_rejected() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.topics.request = "roidota/response/self".to_string();
    assert_invalid(config.validate(), "must not fall under topics.response_prefix")
}

#[test]
fn invalid_bind_is_rejected() -> TestResult {
    assert_invalid(
        RoidotaConfig::from_toml_str("[http]\nbind = \"localhost\"\n"),
        "invalid http.bind address",
    )
}

#[test]
fn mqtt_limits_are_enforced() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.mqtt = MqttConfig {
        keep_alive_secs: 1,
        ..MqttConfig::default()
    };
    assert_invalid(config.validate(), "mqtt.keep_alive_secs")?;
    config.mqtt = MqttConfig {
        client_id: String::new(),
        ..MqttConfig::default()
    };
    assert_invalid(config.validate(), "mqtt.client_id")?;
    config.mqtt = MqttConfig {
        channel_capacity: 0,
        ..MqttConfig::default()
    };
    assert_invalid(config.validate(), "mqtt.channel_capacity")
}

#[test]
fn mqtt_packet_limit_is_configurable_and_bounded() -> TestResult {
    let config = RoidotaConfig::from_toml_str("[mqtt]\nmax_packet_bytes = 65536\n")
        .map_err(|err| err.to_string())?;
    if config.mqtt.max_packet_bytes != 65_536 {
        return Err(format!("packet limit not applied: {}", config.mqtt.max_packet_bytes));
    }
    assert_invalid(
        RoidotaConfig::from_toml_str("[mqtt]\nmax_packet_bytes = 512\n"),
        "mqtt.max_packet_bytes",
    )?;
    assert_invalid(
        RoidotaConfig::from_toml_str("[mqtt]\nmax_packet_bytes = 300000000\n"),
        "mqtt.max_packet_bytes",
    )
}

#[test]
fn zero_body_limit_is_rejected() -> TestResult {
    assert_invalid(
        RoidotaConfig::from_toml_str("[http]\nmax_body_bytes = 0\n"),
        "http.max_body_bytes",
    )
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    assert_invalid(RoidotaConfig::from_toml_str("[mqtt\nport = 1"), "config parse error")
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_explicit_path() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("roidota.toml");
    fs::write(&path, "[manifest]\npath = \"/srv/ota/manifest.json\"\n")
        .map_err(|err| err.to_string())?;
    let config = RoidotaConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.manifest.path != PathBuf::from("/srv/ota/manifest.json") {
        return Err("manifest path not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_explicit_path_fails() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(RoidotaConfig::load(Some(&path)), "config io error")
}
