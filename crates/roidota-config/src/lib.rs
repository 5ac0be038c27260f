// crates/roidota-config/src/lib.rs
// ============================================================================
// Module: Roidota Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for roidota.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `roidota-config` defines the configuration model for the firmware broker:
//! the manifest path, MQTT connection and topics, the control API bind, and
//! the log filter. Validation is strict and runs on every load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
