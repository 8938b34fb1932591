// crates/gridsched-core/src/runtime/dispatch.rs
// ============================================================================
// Module: Gridsched Scheduling Dispatcher
// Description: Submit one scheduling job and commit the device's last-known
//              state.
// Purpose: Guarantee at-most-once semantics for an accepted event: the state
//          commit happens only after the dispatch is accepted.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! The dispatcher is the only writer of device state. It performs a single
//! best-effort enqueue keyed by the raw event address, then commits the new
//! `(datetime, event id, SOC)` triple atomically through the device store.
//! A dispatch failure prevents the commit, so no partial state is ever left
//! behind. Retry and backoff of the computation itself belong to the
//! external scheduler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;
use tracing::warn;

use crate::core::DeviceUpdate;
use crate::core::JobKey;
use crate::core::UdiEventError;
use crate::interfaces::DeviceStore;
use crate::interfaces::ScheduleJobRequest;
use crate::interfaces::SchedulerDispatch;

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Submits `request` to the scheduler under `key`, then commits `update` to
/// the device store.
///
/// # Errors
///
/// Returns [`UdiEventError::DispatchFailed`] when the queue rejects the job
/// (the device state is left untouched) and [`UdiEventError::StoreFailure`]
/// when the subsequent commit fails.
pub fn dispatch_and_commit(
    scheduler: &dyn SchedulerDispatch,
    devices: &dyn DeviceStore,
    key: &JobKey,
    request: &ScheduleJobRequest,
    update: &DeviceUpdate,
) -> Result<(), UdiEventError> {
    scheduler.submit(key, request).map_err(|error| {
        warn!(
            asset_id = %request.asset_id,
            job_key = %key,
            %error,
            "scheduler rejected job; device state left unchanged"
        );
        UdiEventError::DispatchFailed { message: error.to_string() }
    })?;

    devices.commit_event(request.asset_id, update).map_err(|error| {
        warn!(asset_id = %request.asset_id, %error, "device state commit failed after dispatch");
        UdiEventError::StoreFailure { message: error.to_string() }
    })?;

    debug!(
        asset_id = %request.asset_id,
        event_id = %update.event_id,
        job_key = %key,
        "scheduling job dispatched and device state committed"
    );
    Ok(())
}
