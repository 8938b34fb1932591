//! Boundary validation tests for gridsched-config.
// crates/gridsched-config/tests/boundary_validation.rs
// =============================================================================
// Module: Boundary Validation Tests
// Description: Tests for numeric boundaries and policy conversion.
// Purpose: Ensure validation rejects every out-of-range scheduling value.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use gridsched_config::ConfigError;
use gridsched_config::GridschedConfig;
use gridsched_config::SchedulingMode;
use gridsched_config::StoreConfig;
use gridsched_core::runtime::OperatingMode;

type TestResult = Result<(), String>;

/// Assert that a validation result is an error containing a specific substring.
fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn defaults_validate_cleanly() -> TestResult {
    let config = GridschedConfig::default();
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn planning_horizon_at_one_slot_accepted() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.planning_horizon_minutes = 15;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn planning_horizon_at_zero_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.planning_horizon_minutes = 0;
    assert_invalid(config.validate(), "planning_horizon_minutes must be greater than zero")?;
    Ok(())
}

#[test]
fn negative_planning_horizon_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.planning_horizon_minutes = -60;
    assert_invalid(config.validate(), "planning_horizon_minutes must be greater than zero")?;
    Ok(())
}

#[test]
fn non_quarter_hour_resolution_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.resolution_minutes = 5;
    assert_invalid(config.validate(), "resolution_minutes must be 15")?;
    Ok(())
}

#[test]
fn horizon_not_divisible_by_resolution_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.planning_horizon_minutes = 100;
    assert_invalid(config.validate(), "must be divisible by the resolution")?;
    Ok(())
}

#[test]
fn zero_default_message_duration_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.default_message_duration_minutes = 0;
    assert_invalid(
        config.validate(),
        "default_message_duration_minutes must be greater than zero",
    )?;
    Ok(())
}

#[test]
fn blank_scheduler_label_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.scheduler_label = "   ".to_string();
    assert_invalid(config.validate(), "scheduler_label must be non-empty")?;
    Ok(())
}

#[test]
fn blank_store_path_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.store = Some(StoreConfig { path: " ".to_string() });
    assert_invalid(config.validate(), "store.path must be non-empty")?;
    Ok(())
}

#[test]
fn overlong_store_path_rejected() -> TestResult {
    let mut config = GridschedConfig::default();
    config.store = Some(StoreConfig { path: "a".repeat(5_000) });
    assert_invalid(config.validate(), "store.path exceeds max length")?;
    Ok(())
}

#[test]
fn policy_conversion_carries_the_mode() -> TestResult {
    let mut config = GridschedConfig::default();
    config.scheduling.mode = SchedulingMode::Permissive;
    assert_eq!(config.scheduling_policy().mode, OperatingMode::Permissive);
    let standard = GridschedConfig::default();
    assert_eq!(standard.scheduling_policy().mode, OperatingMode::Standard);
    Ok(())
}
