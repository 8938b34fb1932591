// crates/gridsched-core/src/interfaces/mod.rs
// ============================================================================
// Module: Gridsched Interfaces
// Description: Backend-agnostic interfaces for device state, jobs, computed
//              series, and scheduler dispatch.
// Purpose: Define the contract surfaces used by the Gridsched runtime.
// Dependencies: crate::core, serde, thiserror, time
// ============================================================================

//! ## Overview
//! Interfaces define how Gridsched integrates with its external
//! collaborators without embedding backend-specific details. All calls are
//! synchronous and blocking from the perspective of one request; the core
//! defines no timeouts and propagates a hung collaborator call as-is.
//!
//! Implementations must guarantee that a device's last-known-state update is
//! atomic and linearizable with respect to concurrent reads, so a retrieval
//! request racing an ingestion request never observes a torn
//! `(last_event_datetime, last_event_id)` pair.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;

use crate::core::AssetId;
use crate::core::ComputedValue;
use crate::core::Device;
use crate::core::DeviceUpdate;
use crate::core::JobKey;
use crate::core::SourceId;
use crate::core::TargetSeries;

// ============================================================================
// SECTION: Device Store
// ============================================================================

/// Store errors shared by the device, source, and time-series surfaces.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
}

/// Device store for asset records and last-known-event state.
pub trait DeviceStore {
    /// Loads a device by asset identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, asset_id: AssetId) -> Result<Option<Device>, StoreError>;

    /// Commits the device's last-known-event state atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the commit fails; on failure no partial
    /// state may be left behind.
    fn commit_event(&self, asset_id: AssetId, update: &DeviceUpdate) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Access Policy
// ============================================================================

/// Opaque authorization check for device access.
pub trait AccessPolicy {
    /// Returns whether the current caller may access the device.
    fn can_access(&self, device: &Device) -> bool;
}

// ============================================================================
// SECTION: Job Store
// ============================================================================

/// Resolved prerequisite of a deferred job.
///
/// # Invariants
/// - `status` is the raw queue-layer status label, reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteJob {
    /// Key of the prerequisite job.
    pub id: JobKey,
    /// Queue-layer status label of the prerequisite job.
    pub status: String,
}

/// Lifecycle state of a scheduling job, matched exhaustively.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - `Other` covers queue backends reporting states outside the canonical
///   five; the runtime maps it to a "not ready" outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    /// Waiting in the queue.
    Queued,
    /// Picked up by a worker.
    Started,
    /// Waiting on a prerequisite job. `None` when the prerequisite
    /// reference itself cannot be resolved.
    Deferred {
        /// Resolved prerequisite, when the queue can name it.
        prerequisite: Option<PrerequisiteJob>,
    },
    /// Completed successfully.
    Finished {
        /// Anchor start time of the computed schedule.
        #[serde(with = "time::serde::rfc3339")]
        start: OffsetDateTime,
    },
    /// Completed with a failure.
    Failed {
        /// Failure cause stored by the worker, absent when the worker's
        /// exception handler did not record one.
        cause: Option<String>,
    },
    /// Any other queue-layer state.
    Other {
        /// Raw status label reported by the queue.
        status: String,
    },
}

/// Scheduling job handle fetched from the external queue.
///
/// # Invariants
/// - `key` is the raw event address the job was enqueued under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Job key (the raw event address).
    pub key: JobKey,
    /// Current lifecycle state.
    pub state: JobState,
}

/// Job store errors.
///
/// # Invariants
/// - An `Err` means the store could not answer; "no such job" is the `Ok(None)`
///   case of [`JobStore::fetch`], never an error.
#[derive(Debug, Error)]
pub enum JobStoreError {
    /// The job store could not be reached.
    #[error("job store unreachable: {0}")]
    Unreachable(String),
    /// The job store returned data the core cannot interpret.
    #[error("job store invalid data: {0}")]
    Invalid(String),
}

/// Job store exposing scheduling-job lifecycle state.
pub trait JobStore {
    /// Fetches the job enqueued under `key`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`JobStoreError`] when the lookup itself fails; this is
    /// distinct from a clean `Ok(None)`.
    fn fetch(&self, key: &JobKey) -> Result<Option<JobHandle>, JobStoreError>;
}

// ============================================================================
// SECTION: Time-Series Store
// ============================================================================

/// Time-series store for computed schedule values.
pub trait TimeSeriesStore {
    /// Queries computed values for `(asset, source)` with
    /// `datetime ∈ [from, to)`, ordered by datetime ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn query(
        &self,
        asset_id: AssetId,
        source_id: SourceId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<ComputedValue>, StoreError>;
}

// ============================================================================
// SECTION: Source Directory
// ============================================================================

/// Directory resolving computation-source labels to identifiers.
pub trait SourceDirectory {
    /// Looks up a computation source by its well-known label.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn lookup(&self, label: &str) -> Result<Option<SourceId>, StoreError>;
}

// ============================================================================
// SECTION: Scheduler Dispatch
// ============================================================================

/// Scheduling job request handed to the external scheduler.
///
/// # Invariants
/// - `end - start` equals the planning horizon; `targets` spans the same
///   window right-closed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleJobRequest {
    /// Asset to schedule.
    pub asset_id: AssetId,
    /// Start of the scheduling window (the event datetime).
    pub start: OffsetDateTime,
    /// End of the scheduling window.
    pub end: OffsetDateTime,
    /// Grid resolution of the schedule.
    pub resolution: Duration,
    /// Belief time of the submitted state (the event datetime).
    pub belief_time: OffsetDateTime,
    /// State of charge at `start`, in MWh.
    pub soc_at_start_mwh: f64,
    /// Sparse SOC targets over `(start, end]`.
    pub targets: TargetSeries,
    /// Raw entity address of the triggering event.
    pub event_address: String,
}

/// Dispatch errors for scheduling-job submission.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The scheduler queue rejected or could not accept the job.
    #[error("scheduler dispatch error: {0}")]
    Rejected(String),
}

/// Scheduler queue accepting asynchronous scheduling jobs.
///
/// Submissions are keyed by the raw event address, so re-submitting the same
/// accepted event overwrites (or no-ops) harmlessly at the queue layer.
pub trait SchedulerDispatch {
    /// Submits one scheduling job under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the queue does not accept the job.
    fn submit(&self, key: &JobKey, request: &ScheduleJobRequest) -> Result<(), DispatchError>;
}
