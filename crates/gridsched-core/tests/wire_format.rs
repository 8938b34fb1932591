//! Wire-format tests for request, response, and job-state serialization.
// crates/gridsched-core/tests/wire_format.rs
// =============================================================================
// Module: Wire Format Tests
// Description: Validate JSON shapes of the client-facing records.
// Purpose: Ensure the wire model stays stable for API hosts and queue
//          backends.
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

use gridsched_core::AssetId;
use gridsched_core::EventId;
use gridsched_core::JobState;
use gridsched_core::UdiEventAck;
use gridsched_core::UdiEventRequest;
use serde_json::json;
use time::macros::datetime;

type TestResult = Result<(), String>;

#[test]
fn udi_event_request_deserializes_with_all_fields() -> TestResult {
    let payload = json!({
        "event": "ea1.io.gridsched:1:6:soc-with-targets",
        "datetime": "2024-03-01T13:00:00+00:00",
        "value": 12.1,
        "unit": "kWh",
        "targets": [{"value": 25.0, "datetime": "2024-03-01T15:00:00+00:00"}]
    });
    let request: UdiEventRequest =
        serde_json::from_value(payload).map_err(|err| err.to_string())?;
    assert_eq!(request.event.as_deref(), Some("ea1.io.gridsched:1:6:soc-with-targets"));
    assert_eq!(request.value, Some(12.1));
    let targets = request.targets.ok_or("targets missing")?;
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].value, Some(25.0));
    Ok(())
}

#[test]
fn udi_event_request_tolerates_missing_fields() -> TestResult {
    // Shape-level deserialization must succeed; the validation pipeline owns
    // the rejection with a precise error.
    let request: UdiEventRequest =
        serde_json::from_value(json!({})).map_err(|err| err.to_string())?;
    assert!(request.event.is_none());
    assert!(request.datetime.is_none());
    assert!(request.targets.is_none());
    Ok(())
}

#[test]
fn udi_event_ack_serializes_flat_identifiers() -> TestResult {
    let ack = UdiEventAck {
        asset_id: AssetId::from_raw(1).ok_or("nonzero asset id")?,
        event_id: EventId::new(6),
    };
    let value = serde_json::to_value(ack).map_err(|err| err.to_string())?;
    assert_eq!(value, json!({"asset_id": 1, "event_id": 6}));
    Ok(())
}

#[test]
fn job_state_round_trips_through_its_tag() -> TestResult {
    let state = JobState::Finished { start: datetime!(2024-03-02 00:00 UTC) };
    let value = serde_json::to_value(&state).map_err(|err| err.to_string())?;
    assert_eq!(value.get("state").and_then(|tag| tag.as_str()), Some("finished"));
    let back: JobState = serde_json::from_value(value).map_err(|err| err.to_string())?;
    assert_eq!(back, state);
    Ok(())
}

#[test]
fn unknown_queue_state_deserializes_into_other() -> TestResult {
    let value = json!({"state": "other", "status": "scheduled"});
    let state: JobState = serde_json::from_value(value).map_err(|err| err.to_string())?;
    assert_eq!(state, JobState::Other { status: "scheduled".to_owned() });
    Ok(())
}
