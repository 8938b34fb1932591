// crates/gridsched-config/src/config.rs
// ============================================================================
// Module: Gridsched Configuration
// Description: Configuration loading and validation for the scheduling
//              runtime.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: gridsched-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: the runtime never starts
//! with a policy it could not fully validate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use gridsched_core::RESOLUTION;
use gridsched_core::runtime::OperatingMode;
use gridsched_core::runtime::SchedulingPolicy;
use serde::Deserialize;
use thiserror::Error;
use time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "gridsched.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "GRIDSCHED_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default planning horizon in minutes (48 hours).
const DEFAULT_PLANNING_HORIZON_MINUTES: i64 = 48 * 60;
/// Default schedule resolution in minutes.
const DEFAULT_RESOLUTION_MINUTES: i64 = 15;
/// Default message duration in minutes (6 hours).
const DEFAULT_MESSAGE_DURATION_MINUTES: i64 = 6 * 60;
/// Default computation-source label for assembled schedules.
const DEFAULT_SCHEDULER_LABEL: &str = "schedule by gridsched";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Gridsched runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GridschedConfig {
    /// Scheduling policy configuration.
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    /// Optional durable store configuration.
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

impl GridschedConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
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
        self.scheduling.validate()?;
        if let Some(store) = &self.store {
            store.validate()?;
        }
        Ok(())
    }

    /// Converts the validated configuration into the runtime policy.
    #[must_use]
    pub fn scheduling_policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            planning_horizon: Duration::minutes(self.scheduling.planning_horizon_minutes),
            resolution: Duration::minutes(self.scheduling.resolution_minutes),
            scheduler_label: self.scheduling.scheduler_label.clone(),
            default_message_duration: Duration::minutes(
                self.scheduling.default_message_duration_minutes,
            ),
            mode: match self.scheduling.mode {
                SchedulingMode::Standard => OperatingMode::Standard,
                SchedulingMode::Permissive => OperatingMode::Permissive,
            },
        }
    }
}

impl Default for GridschedConfig {
    fn default() -> Self {
        Self { scheduling: SchedulingConfig::default(), store: None }
    }
}

/// Event-ordering enforcement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// Enforce monotone event datetimes and identifiers.
    Standard,
    /// Accept replays and out-of-order events.
    Permissive,
}

/// Scheduling policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// Planning horizon in minutes.
    #[serde(default = "default_planning_horizon_minutes")]
    pub planning_horizon_minutes: i64,
    /// Schedule resolution in minutes.
    #[serde(default = "default_resolution_minutes")]
    pub resolution_minutes: i64,
    /// Computation-source label assembled schedules are read from.
    #[serde(default = "default_scheduler_label")]
    pub scheduler_label: String,
    /// Default retrieval duration in minutes when a request names none.
    #[serde(default = "default_message_duration_minutes")]
    pub default_message_duration_minutes: i64,
    /// Event-ordering enforcement mode.
    #[serde(default = "default_mode")]
    pub mode: SchedulingMode,
}

impl SchedulingConfig {
    /// Validates scheduling configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.planning_horizon_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "scheduling.planning_horizon_minutes must be greater than zero".to_string(),
            ));
        }
        if Duration::minutes(self.resolution_minutes) != RESOLUTION {
            return Err(ConfigError::Invalid(
                "scheduling.resolution_minutes must be 15".to_string(),
            ));
        }
        if self.planning_horizon_minutes % self.resolution_minutes != 0 {
            return Err(ConfigError::Invalid(
                "scheduling.planning_horizon_minutes must be divisible by the resolution"
                    .to_string(),
            ));
        }
        if self.default_message_duration_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "scheduling.default_message_duration_minutes must be greater than zero"
                    .to_string(),
            ));
        }
        if self.scheduler_label.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "scheduling.scheduler_label must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            planning_horizon_minutes: default_planning_horizon_minutes(),
            resolution_minutes: default_resolution_minutes(),
            scheduler_label: default_scheduler_label(),
            default_message_duration_minutes: default_message_duration_minutes(),
            mode: default_mode(),
        }
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Filesystem path of the SQLite database.
    pub path: String,
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.path)
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default planning horizon in minutes.
const fn default_planning_horizon_minutes() -> i64 {
    DEFAULT_PLANNING_HORIZON_MINUTES
}

/// Default schedule resolution in minutes.
const fn default_resolution_minutes() -> i64 {
    DEFAULT_RESOLUTION_MINUTES
}

/// Default computation-source label.
fn default_scheduler_label() -> String {
    DEFAULT_SCHEDULER_LABEL.to_string()
}

/// Default retrieval duration in minutes.
const fn default_message_duration_minutes() -> i64 {
    DEFAULT_MESSAGE_DURATION_MINUTES
}

/// Default enforcement mode.
const fn default_mode() -> SchedulingMode {
    SchedulingMode::Standard
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
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

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
