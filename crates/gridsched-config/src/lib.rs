// crates/gridsched-config/src/lib.rs
// ============================================================================
// Module: Gridsched Config Library
// Description: Canonical config model, validation, and policy conversion.
// Purpose: Single source of truth for gridsched.toml semantics.
// Dependencies: gridsched-core, serde, toml
// ============================================================================

//! ## Overview
//! `gridsched-config` defines the canonical configuration model for the
//! scheduling runtime. It provides strict, fail-closed validation and a
//! deterministic conversion into the runtime policy object.
//!
//! Config inputs are untrusted; loading enforces hard limits on path
//! length, file size, and encoding before any parsing happens.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::GridschedConfig;
pub use config::SchedulingConfig;
pub use config::SchedulingMode;
pub use config::StoreConfig;
