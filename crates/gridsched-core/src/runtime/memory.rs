// crates/gridsched-core/src/runtime/memory.rs
// ============================================================================
// Module: Gridsched In-Memory Collaborators
// Description: In-memory implementations of the collaborator interfaces.
// Purpose: Back end-to-end tests and embedded hosts without external
//          services.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! These implementations keep everything behind a mutex in process memory.
//! The job store and the scheduler carry failure-injection switches so tests
//! can exercise the outage and rejection paths; both default to healthy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;

use crate::core::AssetId;
use crate::core::ComputedValue;
use crate::core::Device;
use crate::core::DeviceUpdate;
use crate::core::JobKey;
use crate::core::SourceId;
use crate::interfaces::AccessPolicy;
use crate::interfaces::DeviceStore;
use crate::interfaces::DispatchError;
use crate::interfaces::JobHandle;
use crate::interfaces::JobStore;
use crate::interfaces::JobStoreError;
use crate::interfaces::ScheduleJobRequest;
use crate::interfaces::SchedulerDispatch;
use crate::interfaces::SourceDirectory;
use crate::interfaces::StoreError;
use crate::interfaces::TimeSeriesStore;

// ============================================================================
// SECTION: Device Store
// ============================================================================

/// In-memory device store.
#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    /// Device records by asset identifier.
    devices: Mutex<HashMap<AssetId, Device>>,
}

impl InMemoryDeviceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a device record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert(&self, device: Device) -> Result<(), StoreError> {
        let mut devices =
            self.devices.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        devices.insert(device.asset_id, device);
        Ok(())
    }
}

impl DeviceStore for InMemoryDeviceStore {
    fn get(&self, asset_id: AssetId) -> Result<Option<Device>, StoreError> {
        let devices =
            self.devices.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        Ok(devices.get(&asset_id).cloned())
    }

    fn commit_event(&self, asset_id: AssetId, update: &DeviceUpdate) -> Result<(), StoreError> {
        let mut devices =
            self.devices.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        let device = devices
            .get_mut(&asset_id)
            .ok_or_else(|| StoreError::Invalid(format!("no device for asset {asset_id}")))?;
        device.last_event_datetime = Some(update.datetime);
        device.last_event_id = Some(update.event_id);
        device.last_soc_mwh = Some(update.soc_mwh);
        Ok(())
    }
}

// ============================================================================
// SECTION: Access Policy
// ============================================================================

/// Access policy granting every caller access to every device.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl AccessPolicy for OpenAccess {
    fn can_access(&self, _device: &Device) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Job Store
// ============================================================================

/// In-memory scheduling-job store with an outage switch.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    /// Job handles by key.
    jobs: Mutex<HashMap<JobKey, JobHandle>>,
    /// When set, every lookup fails as unreachable.
    unreachable: AtomicBool,
}

impl InMemoryJobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a job handle.
    ///
    /// # Errors
    ///
    /// Returns [`JobStoreError`] when the store mutex is poisoned.
    pub fn insert(&self, handle: JobHandle) -> Result<(), JobStoreError> {
        let mut jobs =
            self.jobs.lock().map_err(|error| JobStoreError::Invalid(error.to_string()))?;
        jobs.insert(handle.key.clone(), handle);
        Ok(())
    }

    /// Switches lookup availability; `true` makes every fetch fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

impl JobStore for InMemoryJobStore {
    fn fetch(&self, key: &JobKey) -> Result<Option<JobHandle>, JobStoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(JobStoreError::Unreachable("job store offline".to_owned()));
        }
        let jobs =
            self.jobs.lock().map_err(|error| JobStoreError::Invalid(error.to_string()))?;
        Ok(jobs.get(key).cloned())
    }
}

// ============================================================================
// SECTION: Time-Series Store
// ============================================================================

/// In-memory computed-value store.
#[derive(Debug, Default)]
pub struct InMemoryTimeSeriesStore {
    /// All stored values, unordered.
    values: Mutex<Vec<ComputedValue>>,
}

impl InMemoryTimeSeriesStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends computed values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert(&self, rows: &[ComputedValue]) -> Result<(), StoreError> {
        let mut values =
            self.values.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        values.extend_from_slice(rows);
        Ok(())
    }
}

impl TimeSeriesStore for InMemoryTimeSeriesStore {
    fn query(
        &self,
        asset_id: AssetId,
        source_id: SourceId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<ComputedValue>, StoreError> {
        let values =
            self.values.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        let mut rows: Vec<ComputedValue> = values
            .iter()
            .filter(|row| {
                row.asset_id == asset_id
                    && row.source_id == source_id
                    && row.datetime >= from
                    && row.datetime < to
            })
            .copied()
            .collect();
        rows.sort_by_key(|row| row.datetime);
        Ok(rows)
    }
}

// ============================================================================
// SECTION: Source Directory
// ============================================================================

/// In-memory computation-source directory.
#[derive(Debug, Default)]
pub struct InMemorySourceDirectory {
    /// Source identifiers by label.
    sources: Mutex<HashMap<String, SourceId>>,
}

impl InMemorySourceDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source under a label.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the directory mutex is poisoned.
    pub fn register(&self, label: impl Into<String>, source_id: SourceId) -> Result<(), StoreError> {
        let mut sources =
            self.sources.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        sources.insert(label.into(), source_id);
        Ok(())
    }
}

impl SourceDirectory for InMemorySourceDirectory {
    fn lookup(&self, label: &str) -> Result<Option<SourceId>, StoreError> {
        let sources =
            self.sources.lock().map_err(|error| StoreError::Store(error.to_string()))?;
        Ok(sources.get(label).copied())
    }
}

// ============================================================================
// SECTION: Recording Scheduler
// ============================================================================

/// Scheduler stub recording submissions, with a rejection switch.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    /// Accepted submissions in order.
    submissions: Mutex<Vec<(JobKey, ScheduleJobRequest)>>,
    /// When set, every submission is rejected.
    reject: AtomicBool,
}

impl RecordingScheduler {
    /// Creates a scheduler that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches rejection behavior; `true` makes every submit fail.
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Returns the accepted submissions in order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the recorder mutex is poisoned.
    pub fn submissions(&self) -> Result<Vec<(JobKey, ScheduleJobRequest)>, DispatchError> {
        let submissions = self
            .submissions
            .lock()
            .map_err(|error| DispatchError::Rejected(error.to_string()))?;
        Ok(submissions.clone())
    }
}

impl SchedulerDispatch for RecordingScheduler {
    fn submit(&self, key: &JobKey, request: &ScheduleJobRequest) -> Result<(), DispatchError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(DispatchError::Rejected("scheduler queue rejected the job".to_owned()));
        }
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|error| DispatchError::Rejected(error.to_string()))?;
        submissions.push((key.clone(), request.clone()));
        Ok(())
    }
}
