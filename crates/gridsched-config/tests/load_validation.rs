//! Config load validation tests for gridsched-config.
// crates/gridsched-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
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

use std::io::Write;
use std::path::Path;

use gridsched_config::ConfigError;
use gridsched_config::GridschedConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<GridschedConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(GridschedConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(GridschedConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(GridschedConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(GridschedConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[scheduling\nmode = ").map_err(|err| err.to_string())?;
    assert_invalid(GridschedConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_accepts_empty_file_with_defaults() -> TestResult {
    let file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let config =
        GridschedConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    assert_eq!(config.scheduling.planning_horizon_minutes, 48 * 60);
    assert_eq!(config.scheduling.resolution_minutes, 15);
    assert_eq!(config.scheduling.scheduler_label, "schedule by gridsched");
    assert!(config.store.is_none());
    Ok(())
}

#[test]
fn load_parses_full_document() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let document = concat!(
        "[scheduling]\n",
        "planning_horizon_minutes = 1440\n",
        "resolution_minutes = 15\n",
        "scheduler_label = \"schedule by gridsched\"\n",
        "default_message_duration_minutes = 120\n",
        "mode = \"permissive\"\n",
        "\n",
        "[store]\n",
        "path = \"gridsched.db\"\n",
    );
    file.write_all(document.as_bytes()).map_err(|err| err.to_string())?;
    let config =
        GridschedConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    assert_eq!(config.scheduling.planning_horizon_minutes, 1440);
    assert_eq!(
        config.store.as_ref().map(|store| store.path.as_str()),
        Some("gridsched.db")
    );
    let policy = config.scheduling_policy();
    assert_eq!(policy.planning_horizon, time::Duration::hours(24));
    assert_eq!(policy.default_message_duration, time::Duration::hours(2));
    Ok(())
}
