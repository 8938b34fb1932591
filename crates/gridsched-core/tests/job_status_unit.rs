//! Job-state translation tests covering every lifecycle branch.
// crates/gridsched-core/tests/job_status_unit.rs
// =============================================================================
// Module: Job Status Translation Tests
// Description: Validate the job-state translator over all lifecycle branches.
// Purpose: Ensure retrieval outcomes are deterministic for every job state
//          and for the last-known-event fallback.
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
use gridsched_core::Device;
use gridsched_core::EventId;
use gridsched_core::EventReference;
use gridsched_core::EventType;
use gridsched_core::JobHandle;
use gridsched_core::JobKey;
use gridsched_core::JobState;
use gridsched_core::PrerequisiteJob;
use gridsched_core::UdiEventError;
use gridsched_core::runtime::AnchorQualifier;
use gridsched_core::runtime::InMemoryJobStore;
use gridsched_core::runtime::resolve_anchor;
use time::OffsetDateTime;
use time::macros::datetime;

type TestResult = Result<(), String>;

/// Builds a battery device with the given last-known event.
fn device(
    last_event_id: Option<u64>,
    last_event_datetime: Option<OffsetDateTime>,
) -> Result<Device, String> {
    Ok(Device {
        asset_id: AssetId::from_raw(1).ok_or("nonzero asset id")?,
        device_type: "battery".to_owned(),
        last_event_datetime,
        last_event_id: last_event_id.map(EventId::new),
        last_soc_mwh: Some(0.01),
    })
}

/// Builds a soc event reference for asset 1.
fn reference(event_id: u64) -> Result<EventReference, String> {
    Ok(EventReference {
        asset_id: AssetId::from_raw(1).ok_or("nonzero asset id")?,
        event_id: EventId::new(event_id),
        event_type: EventType::Soc,
    })
}

/// Stores a job handle under the test key and returns the store.
fn store_with(state: JobState) -> Result<InMemoryJobStore, String> {
    let store = InMemoryJobStore::new();
    store
        .insert(JobHandle { key: JobKey::from("ea1.io.gridsched:1:7:soc"), state })
        .map_err(|error| error.to_string())?;
    Ok(store)
}

/// Test key matching the handle stored by `store_with`.
fn key() -> JobKey {
    JobKey::from("ea1.io.gridsched:1:7:soc")
}

#[test]
fn missing_job_falls_back_to_last_known_event() -> TestResult {
    let last = datetime!(2024-03-01 12:00 UTC);
    let device = device(Some(7), Some(last))?;
    let anchor = resolve_anchor(&InMemoryJobStore::new(), &device, &reference(7)?, &key())
        .map_err(|error| error.to_string())?;
    assert_eq!(anchor.start, last);
    assert_eq!(anchor.qualifier, AnchorQualifier::LastKnownEvent);
    Ok(())
}

#[test]
fn missing_job_with_unmatched_event_id_is_unrecognized() -> TestResult {
    let device = device(Some(6), Some(datetime!(2024-03-01 12:00 UTC)))?;
    let result = resolve_anchor(&InMemoryJobStore::new(), &device, &reference(7)?, &key());
    assert!(matches!(result, Err(UdiEventError::UnrecognizedEvent { event_id }) if event_id == EventId::new(7)));
    Ok(())
}

#[test]
fn missing_job_without_last_datetime_is_unrecognized() -> TestResult {
    let device = device(Some(7), None)?;
    let result = resolve_anchor(&InMemoryJobStore::new(), &device, &reference(7)?, &key());
    assert!(matches!(result, Err(UdiEventError::UnrecognizedEvent { .. })));
    Ok(())
}

#[test]
fn finished_job_anchors_at_job_start() -> TestResult {
    let start = datetime!(2024-03-02 00:00 UTC);
    let store = store_with(JobState::Finished { start })?;
    let device = device(None, None)?;
    let anchor = resolve_anchor(&store, &device, &reference(7)?, &key())
        .map_err(|error| error.to_string())?;
    assert_eq!(anchor.start, start);
    assert_eq!(anchor.qualifier, AnchorQualifier::JobProcessed);
    Ok(())
}

#[test]
fn failed_job_surfaces_stored_cause() -> TestResult {
    let store = store_with(JobState::Failed {
        cause: Some("TimeoutError: worker exceeded 30s".to_owned()),
    })?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    assert!(matches!(error, UdiEventError::SchedulingFailed { .. }));
    assert!(error.to_string().contains("TimeoutError: worker exceeded 30s"));
    Ok(())
}

#[test]
fn failed_job_without_cause_names_missing_handler() -> TestResult {
    let store = store_with(JobState::Failed { cause: None })?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    assert!(error.to_string().contains("does not state why it failed"));
    assert!(error.to_string().contains("exception handler"));
    Ok(())
}

#[test]
fn started_job_is_not_ready() -> TestResult {
    let store = store_with(JobState::Started)?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    assert!(matches!(error, UdiEventError::ScheduleNotReady { .. }));
    assert!(error.to_string().contains("in progress"));
    Ok(())
}

#[test]
fn queued_job_is_not_ready() -> TestResult {
    let store = store_with(JobState::Queued)?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    assert!(error.to_string().contains("waiting to be processed"));
    Ok(())
}

#[test]
fn deferred_job_with_unknown_prerequisite_is_not_ready() -> TestResult {
    let store = store_with(JobState::Deferred { prerequisite: None })?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    assert!(error.to_string().contains("waiting for unknown job"));
    Ok(())
}

#[test]
fn deferred_job_names_its_prerequisite() -> TestResult {
    let store = store_with(JobState::Deferred {
        prerequisite: Some(PrerequisiteJob {
            id: JobKey::from("ea1.io.gridsched:1:6:soc"),
            status: "started".to_owned(),
        }),
    })?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    let message = error.to_string();
    assert!(message.contains("started"));
    assert!(message.contains("ea1.io.gridsched:1:6:soc"));
    Ok(())
}

#[test]
fn unknown_job_state_is_not_ready() -> TestResult {
    let store = store_with(JobState::Other { status: "scheduled".to_owned() })?;
    let device = device(None, None)?;
    let error = resolve_anchor(&store, &device, &reference(7)?, &key())
        .err()
        .ok_or("expected failure")?;
    assert!(matches!(error, UdiEventError::ScheduleNotReady { .. }));
    assert!(error.to_string().contains("unknown status"));
    Ok(())
}

#[test]
fn job_store_outage_never_triggers_fallback() -> TestResult {
    let store = InMemoryJobStore::new();
    store.set_unreachable(true);
    // Device matches the reference, so a clean not-found would fall back.
    let device = device(Some(7), Some(datetime!(2024-03-01 12:00 UTC)))?;
    let result = resolve_anchor(&store, &device, &reference(7)?, &key());
    assert!(matches!(result, Err(UdiEventError::JobStoreUnavailable { .. })));
    Ok(())
}
