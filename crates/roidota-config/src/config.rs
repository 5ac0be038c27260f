// crates/roidota-config/src/config.rs
// ============================================================================
// Module: Roidota Configuration
// Description: Configuration loading and validation for the firmware broker.
// Purpose: Provide strict config parsing with hard limits and sane defaults.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly requested file (flag or `ROIDOTA_CONFIG`) must exist; when the
//! default `roidota.toml` is absent the built-in defaults are used.
//! Invariants:
//! - Every loaded configuration has passed [`RoidotaConfig::validate`].
//! - Topics never contain MQTT wildcards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "roidota.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ROIDOTA_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum MQTT client identifier length.
pub(crate) const MAX_CLIENT_ID_LENGTH: usize = 256;
/// Maximum topic or topic prefix length.
pub(crate) const MAX_TOPIC_LENGTH: usize = 1024;
/// Minimum MQTT keep-alive interval in seconds.
pub(crate) const MIN_KEEP_ALIVE_SECS: u64 = 5;
/// Maximum reconnect delay in milliseconds.
pub(crate) const MAX_RECONNECT_DELAY_MS: u64 = 60_000;
/// Minimum MQTT packet size limit in bytes.
pub(crate) const MIN_MQTT_PACKET_BYTES: usize = 1024;
/// Maximum MQTT packet size limit in bytes (protocol ceiling).
pub(crate) const MAX_MQTT_PACKET_BYTES: usize = 268_435_460;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Firmware broker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoidotaConfig {
    /// Manifest persistence settings.
    #[serde(default)]
    pub manifest: ManifestConfig,
    /// MQTT connection settings.
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Request/response topic layout.
    #[serde(default)]
    pub topics: TopicsConfig,
    /// Control API settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RoidotaConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.manifest.validate()?;
        self.mqtt.validate()?;
        self.topics.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Manifest persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestConfig {
    /// Path of the persisted manifest file.
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
        }
    }
}

impl ManifestConfig {
    /// Validates the manifest path.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("manifest.path must not be empty".to_string()));
        }
        validate_path(&self.path)
    }
}

/// MQTT connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// Broker hostname or address.
    #[serde(default = "default_mqtt_host")]
    pub host: String,
    /// Broker TCP port.
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    /// Client identifier presented to the broker.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    /// Delay before polling again after a transport failure.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Capacity of the client request queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Largest MQTT packet sent or received, in bytes.
    #[serde(default = "default_max_packet_bytes")]
    pub max_packet_bytes: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive_secs(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            channel_capacity: default_channel_capacity(),
            max_packet_bytes: default_max_packet_bytes(),
        }
    }
}

impl MqttConfig {
    /// Validates MQTT connection settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("mqtt.host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("mqtt.port must be greater than zero".to_string()));
        }
        if self.client_id.is_empty() || self.client_id.len() > MAX_CLIENT_ID_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "mqtt.client_id must be 1..={MAX_CLIENT_ID_LENGTH} bytes"
            )));
        }
        if self.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
            return Err(ConfigError::Invalid(format!(
                "mqtt.keep_alive_secs must be at least {MIN_KEEP_ALIVE_SECS}"
            )));
        }
        if self.reconnect_delay_ms > MAX_RECONNECT_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "mqtt.reconnect_delay_ms must be at most {MAX_RECONNECT_DELAY_MS}"
            )));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "mqtt.channel_capacity must be greater than zero".to_string(),
            ));
        }
        if !(MIN_MQTT_PACKET_BYTES..=MAX_MQTT_PACKET_BYTES).contains(&self.max_packet_bytes) {
            return Err(ConfigError::Invalid(format!(
                "mqtt.max_packet_bytes must be {MIN_MQTT_PACKET_BYTES}..={MAX_MQTT_PACKET_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Request/response topic layout.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicsConfig {
    /// Topic devices publish their identifier to.
    #[serde(default = "default_request_topic")]
    pub request: String,
    /// Prefix joined with a device identifier to form its response topic.
    #[serde(default = "default_response_prefix")]
    pub response_prefix: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            request: default_request_topic(),
            response_prefix: default_response_prefix(),
        }
    }
}

impl TopicsConfig {
    /// Validates topic names.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_topic("topics.request", &self.request)?;
        validate_topic("topics.response_prefix", &self.response_prefix)?;
        if self.request.starts_with(&self.response_prefix) {
            return Err(ConfigError::Invalid(
                "topics.request must not fall under topics.response_prefix".to_string(),
            ));
        }
        Ok(())
    }
}

/// Control API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Socket address the control API binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl HttpConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid http.bind address: {}", self.bind)))
    }

    /// Validates control API settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "http.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Validates the log filter.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must not be empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether it was requested explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a topic name or prefix.
fn validate_topic(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if value.len() > MAX_TOPIC_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds {MAX_TOPIC_LENGTH} bytes")));
    }
    if value.contains(['+', '#', '\0']) {
        return Err(ConfigError::Invalid(format!("{field} must not contain wildcards or NUL")));
    }
    Ok(())
}

/// Default manifest path.
fn default_manifest_path() -> PathBuf {
    PathBuf::from("firmware_manifest.json")
}

/// Default MQTT host.
fn default_mqtt_host() -> String {
    "localhost".to_string()
}

/// Default MQTT port.
const fn default_mqtt_port() -> u16 {
    1883
}

/// Default MQTT client identifier.
fn default_client_id() -> String {
    "roidota-broker".to_string()
}

/// Default MQTT keep-alive in seconds.
const fn default_keep_alive_secs() -> u64 {
    30
}

/// Default reconnect delay in milliseconds.
const fn default_reconnect_delay_ms() -> u64 {
    1_000
}

/// Default MQTT request queue capacity.
const fn default_channel_capacity() -> usize {
    64
}

/// Default MQTT packet size limit, matching the client default.
const fn default_max_packet_bytes() -> usize {
    10 * 1024
}

/// Default request topic.
fn default_request_topic() -> String {
    "roidota/request".to_string()
}

/// Default response topic prefix.
fn default_response_prefix() -> String {
    "roidota/response/".to_string()
}

/// Default control API bind address.
fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default log filter.
fn default_log_filter() -> String {
    "info".to_string()
}
