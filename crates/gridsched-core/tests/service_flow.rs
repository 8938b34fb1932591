//! End-to-end service tests wiring the runtime over in-memory collaborators.
// crates/gridsched-core/tests/service_flow.rs
// =============================================================================
// Module: Service Flow Tests
// Description: Validate the full retrieval and ingestion paths.
// Purpose: Ensure accepted events update device state exactly once, and
//          every failure leaves state untouched.
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

use std::sync::Arc;

use gridsched_core::AssetId;
use gridsched_core::ComputedValue;
use gridsched_core::Device;
use gridsched_core::DeviceMessageRequest;
use gridsched_core::EventId;
use gridsched_core::JobHandle;
use gridsched_core::JobKey;
use gridsched_core::JobState;
use gridsched_core::RESOLUTION;
use gridsched_core::SourceId;
use gridsched_core::TargetRequest;
use gridsched_core::UdiEventError;
use gridsched_core::UdiEventRequest;
use gridsched_core::runtime::InMemoryDeviceStore;
use gridsched_core::runtime::InMemoryJobStore;
use gridsched_core::runtime::InMemorySourceDirectory;
use gridsched_core::runtime::InMemoryTimeSeriesStore;
use gridsched_core::runtime::OpenAccess;
use gridsched_core::runtime::RecordingScheduler;
use gridsched_core::runtime::SchedulingPolicy;
use gridsched_core::runtime::UdiEventService;
use time::Duration;
use time::OffsetDateTime;
use time::macros::datetime;

type TestResult = Result<(), String>;

/// Last-known event datetime of the seeded device.
const T0: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);

/// Full wiring of the service over in-memory collaborators.
struct Harness {
    /// Device store, kept for direct state assertions.
    devices: Arc<InMemoryDeviceStore>,
    /// Job store, kept for lifecycle seeding.
    jobs: Arc<InMemoryJobStore>,
    /// Time-series store, kept for schedule seeding.
    series: Arc<InMemoryTimeSeriesStore>,
    /// Scheduler stub, kept for submission assertions.
    scheduler: Arc<RecordingScheduler>,
    /// Service under test.
    service: UdiEventService,
}

impl Harness {
    /// Builds a harness with one battery device `(id 5, T0, 0.005 MWh)` and
    /// a registered computation source.
    fn new() -> Result<Self, String> {
        let policy = SchedulingPolicy::default();
        let devices = Arc::new(InMemoryDeviceStore::new());
        devices
            .insert(Device {
                asset_id: AssetId::from_raw(1).ok_or("nonzero asset id")?,
                device_type: "battery".to_owned(),
                last_event_datetime: Some(T0),
                last_event_id: Some(EventId::new(5)),
                last_soc_mwh: Some(0.005),
            })
            .map_err(|error| error.to_string())?;
        let jobs = Arc::new(InMemoryJobStore::new());
        let series = Arc::new(InMemoryTimeSeriesStore::new());
        let sources = Arc::new(InMemorySourceDirectory::new());
        sources
            .register(
                policy.scheduler_label.clone(),
                SourceId::from_raw(9).ok_or("nonzero source id")?,
            )
            .map_err(|error| error.to_string())?;
        let scheduler = Arc::new(RecordingScheduler::new());
        let service = UdiEventService::new(
            devices.clone(),
            Arc::new(OpenAccess),
            jobs.clone(),
            series.clone(),
            sources,
            scheduler.clone(),
            policy,
        );
        Ok(Self { devices, jobs, series, scheduler, service })
    }

    /// Returns the seeded device's current state.
    fn device_state(&self) -> Result<Device, String> {
        use gridsched_core::DeviceStore;
        self.devices
            .get(AssetId::from_raw(1).ok_or("nonzero asset id")?)
            .map_err(|error| error.to_string())?
            .ok_or_else(|| "device missing".to_owned())
    }
}

/// Builds an ingestion request for the given address.
fn udi_request(address: &str, datetime: &str, value: f64) -> UdiEventRequest {
    UdiEventRequest {
        event: Some(address.to_owned()),
        datetime: Some(datetime.to_owned()),
        value: Some(value),
        unit: Some("kWh".to_owned()),
        targets: None,
    }
}

#[test]
fn accepted_event_updates_state_and_dispatches_once() -> TestResult {
    let harness = Harness::new()?;
    let ack = harness
        .service
        .post_udi_event(&udi_request(
            "ea1.io.gridsched:1:6:soc",
            "2024-03-01T13:00:00+00:00",
            10.0,
        ))
        .map_err(|error| error.to_string())?;
    assert_eq!(ack.event_id, EventId::new(6));

    let device = harness.device_state()?;
    assert_eq!(device.last_event_id, Some(EventId::new(6)));
    assert_eq!(device.last_event_datetime, Some(datetime!(2024-03-01 13:00 UTC)));
    assert_eq!(device.last_soc_mwh, Some(0.01));

    let submissions = harness.scheduler.submissions().map_err(|error| error.to_string())?;
    assert_eq!(submissions.len(), 1);
    let (key, job) = &submissions[0];
    assert_eq!(key, &JobKey::from("ea1.io.gridsched:1:6:soc"));
    assert_eq!(job.start, datetime!(2024-03-01 13:00 UTC));
    assert_eq!(job.end, job.start + harness.service.policy().planning_horizon);
    assert!((job.soc_at_start_mwh - 0.01).abs() < f64::EPSILON);
    assert!(job.targets.is_empty());
    Ok(())
}

#[test]
fn outdated_event_id_leaves_state_unchanged() -> TestResult {
    let harness = Harness::new()?;
    let result = harness.service.post_udi_event(&udi_request(
        "ea1.io.gridsched:1:4:soc",
        "2024-03-01T13:00:00+00:00",
        10.0,
    ));
    assert!(matches!(result, Err(UdiEventError::OutdatedEventId { .. })));

    let device = harness.device_state()?;
    assert_eq!(device.last_event_id, Some(EventId::new(5)));
    assert_eq!(device.last_event_datetime, Some(T0));
    assert!(harness.scheduler.submissions().map_err(|error| error.to_string())?.is_empty());
    Ok(())
}

#[test]
fn dispatch_failure_prevents_the_state_commit() -> TestResult {
    let harness = Harness::new()?;
    harness.scheduler.set_reject(true);
    let result = harness.service.post_udi_event(&udi_request(
        "ea1.io.gridsched:1:6:soc",
        "2024-03-01T13:00:00+00:00",
        10.0,
    ));
    assert!(matches!(result, Err(UdiEventError::DispatchFailed { .. })));

    let device = harness.device_state()?;
    assert_eq!(device.last_event_id, Some(EventId::new(5)));
    assert_eq!(device.last_soc_mwh, Some(0.005));
    Ok(())
}

#[test]
fn targets_flow_through_to_the_dispatched_job() -> TestResult {
    let harness = Harness::new()?;
    let request = UdiEventRequest {
        event: Some("ea1.io.gridsched:1:6:soc-with-targets".to_owned()),
        datetime: Some("2024-03-01T13:00:00+00:00".to_owned()),
        value: Some(10.0),
        unit: Some("kWh".to_owned()),
        targets: Some(vec![TargetRequest {
            value: Some(20.0),
            datetime: Some("2024-03-01T15:00:00+00:00".to_owned()),
        }]),
    };
    harness.service.post_udi_event(&request).map_err(|error| error.to_string())?;

    let submissions = harness.scheduler.submissions().map_err(|error| error.to_string())?;
    let (_, job) = submissions.first().ok_or("expected one submission")?;
    assert_eq!(job.targets.len(), 1);
    assert_eq!(job.targets.get(datetime!(2024-03-01 15:00 UTC)), Some(0.02));
    Ok(())
}

#[test]
fn failed_job_retrieval_surfaces_the_stored_cause() -> TestResult {
    let harness = Harness::new()?;
    harness
        .jobs
        .insert(JobHandle {
            key: JobKey::from("ea1.io.gridsched:1:5:soc"),
            state: JobState::Failed {
                cause: Some("TimeoutError: worker exceeded 30s".to_owned()),
            },
        })
        .map_err(|error| error.to_string())?;
    let result = harness.service.device_message(&DeviceMessageRequest {
        event: Some("ea1.io.gridsched:1:5:soc".to_owned()),
        duration: None,
    });
    let error = result.err().ok_or("expected failure")?;
    assert!(matches!(error, UdiEventError::SchedulingFailed { .. }));
    assert!(error.to_string().contains("TimeoutError: worker exceeded 30s"));
    Ok(())
}

#[test]
fn finished_job_retrieval_assembles_the_stored_schedule() -> TestResult {
    let harness = Harness::new()?;
    let t1 = datetime!(2024-03-02 00:00 UTC);
    harness
        .jobs
        .insert(JobHandle {
            key: JobKey::from("ea1.io.gridsched:1:5:soc"),
            state: JobState::Finished { start: t1 },
        })
        .map_err(|error| error.to_string())?;
    let asset_id = AssetId::from_raw(1).ok_or("nonzero asset id")?;
    let source_id = SourceId::from_raw(9).ok_or("nonzero source id")?;
    let rows: Vec<ComputedValue> = (0..16)
        .map(|slot| ComputedValue {
            asset_id,
            source_id,
            datetime: t1 + RESOLUTION * slot,
            value_mw: 0.001,
        })
        .collect();
    harness.series.insert(&rows).map_err(|error| error.to_string())?;

    let message = harness
        .service
        .device_message(&DeviceMessageRequest {
            event: Some("ea1.io.gridsched:1:5:soc".to_owned()),
            duration: Some(Duration::hours(6)),
        })
        .map_err(|error| error.to_string())?;
    assert_eq!(message.start, t1);
    assert_eq!(message.duration, Duration::hours(4));
    assert_eq!(message.values.len(), 16);
    Ok(())
}

#[test]
fn retrieval_falls_back_to_the_last_known_event() -> TestResult {
    let harness = Harness::new()?;
    let asset_id = AssetId::from_raw(1).ok_or("nonzero asset id")?;
    let source_id = SourceId::from_raw(9).ok_or("nonzero source id")?;
    let rows: Vec<ComputedValue> = (0..4)
        .map(|slot| ComputedValue {
            asset_id,
            source_id,
            datetime: T0 + RESOLUTION * slot,
            value_mw: 0.002,
        })
        .collect();
    harness.series.insert(&rows).map_err(|error| error.to_string())?;

    // No job exists; event id 5 matches the device's last known event.
    let message = harness
        .service
        .device_message(&DeviceMessageRequest {
            event: Some("ea1.io.gridsched:1:5:soc".to_owned()),
            duration: Some(Duration::hours(1)),
        })
        .map_err(|error| error.to_string())?;
    assert_eq!(message.start, T0);
    assert_eq!(message.values.len(), 4);
    Ok(())
}

#[test]
fn job_store_outage_is_reported_not_masked() -> TestResult {
    let harness = Harness::new()?;
    harness.jobs.set_unreachable(true);
    let result = harness.service.device_message(&DeviceMessageRequest {
        event: Some("ea1.io.gridsched:1:5:soc".to_owned()),
        duration: None,
    });
    assert!(matches!(result, Err(UdiEventError::JobStoreUnavailable { .. })));
    Ok(())
}

#[test]
fn unknown_device_is_an_unrecognized_connection_group() -> TestResult {
    let harness = Harness::new()?;
    let result = harness.service.post_udi_event(&udi_request(
        "ea1.io.gridsched:2:1:soc",
        "2024-03-01T13:00:00+00:00",
        10.0,
    ));
    assert!(matches!(result, Err(UdiEventError::UnrecognizedConnectionGroup { .. })));
    Ok(())
}

#[test]
fn unsupported_device_class_is_rejected() -> TestResult {
    let harness = Harness::new()?;
    harness
        .devices
        .insert(Device {
            asset_id: AssetId::from_raw(3).ok_or("nonzero asset id")?,
            device_type: "wind_turbine".to_owned(),
            last_event_datetime: None,
            last_event_id: None,
            last_soc_mwh: None,
        })
        .map_err(|error| error.to_string())?;
    let result = harness.service.post_udi_event(&udi_request(
        "ea1.io.gridsched:3:1:soc",
        "2024-03-01T13:00:00+00:00",
        10.0,
    ));
    assert!(matches!(result, Err(UdiEventError::UnsupportedDeviceClass { .. })));
    Ok(())
}

#[test]
fn malformed_address_and_unknown_event_type_are_distinct() -> TestResult {
    let harness = Harness::new()?;
    let malformed = harness.service.post_udi_event(&udi_request(
        "not-an-address",
        "2024-03-01T13:00:00+00:00",
        10.0,
    ));
    assert!(matches!(malformed, Err(UdiEventError::InvalidReference { .. })));

    let unknown_type = harness.service.post_udi_event(&udi_request(
        "ea1.io.gridsched:1:6:price-forecast",
        "2024-03-01T13:00:00+00:00",
        10.0,
    ));
    assert!(matches!(unknown_type, Err(UdiEventError::UnrecognizedEventType { .. })));
    Ok(())
}

#[test]
fn event_datetime_without_offset_is_rejected() -> TestResult {
    let harness = Harness::new()?;
    let result = harness.service.post_udi_event(&udi_request(
        "ea1.io.gridsched:1:6:soc",
        "2024-03-01T13:00:00",
        10.0,
    ));
    assert!(matches!(result, Err(UdiEventError::MissingTimezone { .. })));
    Ok(())
}

#[test]
fn missing_value_is_an_incomplete_event() -> TestResult {
    let harness = Harness::new()?;
    let request = UdiEventRequest {
        event: Some("ea1.io.gridsched:1:6:soc".to_owned()),
        datetime: Some("2024-03-01T13:00:00+00:00".to_owned()),
        value: None,
        unit: Some("MWh".to_owned()),
        targets: None,
    };
    let result = harness.service.post_udi_event(&request);
    assert!(matches!(result, Err(UdiEventError::IncompleteEvent { .. })));
    Ok(())
}

#[test]
fn resubmitting_the_same_event_reuses_the_same_job_key() -> TestResult {
    let harness = Harness::new()?;
    let policy_mode_request =
        udi_request("ea1.io.gridsched:1:6:soc", "2024-03-01T13:00:00+00:00", 10.0);
    harness.service.post_udi_event(&policy_mode_request).map_err(|error| error.to_string())?;
    // The second submission is outdated in standard mode; replaying it in a
    // permissive-mode deployment would enqueue under the identical key.
    let result = harness.service.post_udi_event(&policy_mode_request);
    assert!(matches!(result, Err(UdiEventError::OutdatedEventId { .. })));
    let submissions = harness.scheduler.submissions().map_err(|error| error.to_string())?;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0, JobKey::from("ea1.io.gridsched:1:6:soc"));
    Ok(())
}
