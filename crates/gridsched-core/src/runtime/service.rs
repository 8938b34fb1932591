// crates/gridsched-core/src/runtime/service.rs
// ============================================================================
// Module: Gridsched UDI Event Service
// Description: Orchestrate the retrieval and ingestion paths over the
//              collaborator interfaces.
// Purpose: Run the validation pipeline and the reconciliation components in
//          order, one request at a time.
// Dependencies: crate::core, crate::interfaces, crate::runtime, tracing
// ============================================================================

//! ## Overview
//! The service wires the validation pipeline and the five reconciliation
//! components into the two core operations: `device_message` (retrieval)
//! and `post_udi_event` (ingestion). Every request operates on one device
//! and one event reference; the service holds no per-request state and
//! spawns no threads. Failures are logged with the event address so they can
//! be diagnosed without re-deriving state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use tracing::info;
use tracing::warn;

use crate::core::DeviceMessage;
use crate::core::DeviceMessageRequest;
use crate::core::DeviceUpdate;
use crate::core::JobKey;
use crate::core::UdiEventAck;
use crate::core::UdiEventError;
use crate::core::UdiEventRequest;
use crate::interfaces::AccessPolicy;
use crate::interfaces::DeviceStore;
use crate::interfaces::JobStore;
use crate::interfaces::ScheduleJobRequest;
use crate::interfaces::SchedulerDispatch;
use crate::interfaces::SourceDirectory;
use crate::interfaces::TimeSeriesStore;
use crate::runtime::SchedulingPolicy;
use crate::runtime::assembly::assemble_schedule;
use crate::runtime::dispatch::dispatch_and_commit;
use crate::runtime::ordering::validate_event_order;
use crate::runtime::status::resolve_anchor;
use crate::runtime::targets::build_target_series;
use crate::runtime::validate;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Retrieval and ingestion service for UDI events.
///
/// # Invariants
/// - Collaborator calls are synchronous and blocking; no internal threads.
/// - Device state is written only through the scheduling dispatcher.
pub struct UdiEventService {
    /// Device store collaborator.
    devices: Arc<dyn DeviceStore + Send + Sync>,
    /// Authorization collaborator.
    access: Arc<dyn AccessPolicy + Send + Sync>,
    /// Scheduling-job store collaborator.
    jobs: Arc<dyn JobStore + Send + Sync>,
    /// Computed-value time-series store collaborator.
    series: Arc<dyn TimeSeriesStore + Send + Sync>,
    /// Computation-source directory collaborator.
    sources: Arc<dyn SourceDirectory + Send + Sync>,
    /// Scheduler queue collaborator.
    scheduler: Arc<dyn SchedulerDispatch + Send + Sync>,
    /// Injected scheduling policy.
    policy: SchedulingPolicy,
}

impl UdiEventService {
    /// Creates a service over the given collaborators and policy.
    #[must_use]
    pub fn new(
        devices: Arc<dyn DeviceStore + Send + Sync>,
        access: Arc<dyn AccessPolicy + Send + Sync>,
        jobs: Arc<dyn JobStore + Send + Sync>,
        series: Arc<dyn TimeSeriesStore + Send + Sync>,
        sources: Arc<dyn SourceDirectory + Send + Sync>,
        scheduler: Arc<dyn SchedulerDispatch + Send + Sync>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self { devices, access, jobs, series, sources, scheduler, policy }
    }

    /// Returns the injected scheduling policy.
    #[must_use]
    pub const fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Retrieves the schedule for a previously submitted UDI event.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`UdiEventError`] from the validation
    /// pipeline, the job-state translator, or the schedule assembler.
    pub fn device_message(
        &self,
        request: &DeviceMessageRequest,
    ) -> Result<DeviceMessage, UdiEventError> {
        self.device_message_inner(request).inspect_err(|error| {
            warn!(
                event = request.event.as_deref().unwrap_or("<missing>"),
                %error,
                "device message request failed"
            );
        })
    }

    /// Retrieval path without the failure-logging wrapper.
    fn device_message_inner(
        &self,
        request: &DeviceMessageRequest,
    ) -> Result<DeviceMessage, UdiEventError> {
        let address = validate::require_event_address(request.event.as_deref())?;
        let reference = validate::parse_reference(address)?;
        let device = validate::resolve_device(&*self.devices, &*self.access, &reference)?;

        let key = JobKey::from(address);
        let anchor = resolve_anchor(&*self.jobs, &device, &reference, &key)?;
        let requested = validate::resolve_requested_duration(request.duration, &self.policy);
        let result = assemble_schedule(
            &*self.series,
            &*self.sources,
            &device,
            &anchor,
            requested,
            &self.policy,
        )?;

        info!(
            asset_id = %reference.asset_id,
            event_id = %reference.event_id,
            start = %result.start,
            "assembled device message"
        );
        Ok(DeviceMessage {
            event: address.to_owned(),
            values: result.values,
            start: result.start,
            duration: result.duration,
            unit: result.unit,
        })
    }

    /// Ingests a UDI event and dispatches one scheduling job.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`UdiEventError`] from the validation
    /// pipeline, the ordering validator, the target-series builder, or the
    /// scheduling dispatcher.
    pub fn post_udi_event(&self, request: &UdiEventRequest) -> Result<UdiEventAck, UdiEventError> {
        self.post_udi_event_inner(request).inspect_err(|error| {
            warn!(
                event = request.event.as_deref().unwrap_or("<missing>"),
                %error,
                "UDI event rejected"
            );
        })
    }

    /// Ingestion path without the failure-logging wrapper.
    fn post_udi_event_inner(
        &self,
        request: &UdiEventRequest,
    ) -> Result<UdiEventAck, UdiEventError> {
        let datetime = validate::require_event_datetime(request.datetime.as_deref())?;
        let address = validate::require_event_address(request.event.as_deref())?;
        let reference = validate::parse_reference(address)?;
        let device = validate::resolve_device(&*self.devices, &*self.access, &reference)?;

        validate_event_order(&device, datetime, reference.event_id, self.policy.mode)?;

        let unit = validate::parse_soc_unit(request.unit.as_deref())?;
        let soc_mwh = unit.to_mwh(validate::require_soc_value(request.value)?);
        let targets = build_target_series(
            datetime,
            reference.event_type,
            request.targets.as_deref(),
            unit,
            &self.policy,
        )?;

        let key = JobKey::from(address);
        let job = ScheduleJobRequest {
            asset_id: reference.asset_id,
            start: datetime,
            end: datetime + self.policy.planning_horizon,
            resolution: self.policy.resolution,
            belief_time: datetime,
            soc_at_start_mwh: soc_mwh,
            targets,
            event_address: address.to_owned(),
        };
        let update = DeviceUpdate { datetime, event_id: reference.event_id, soc_mwh };
        dispatch_and_commit(&*self.scheduler, &*self.devices, &key, &job, &update)?;

        info!(
            asset_id = %reference.asset_id,
            event_id = %reference.event_id,
            "UDI event accepted"
        );
        Ok(UdiEventAck { asset_id: reference.asset_id, event_id: reference.event_id })
    }
}
