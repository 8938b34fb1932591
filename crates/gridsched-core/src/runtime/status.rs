// crates/gridsched-core/src/runtime/status.rs
// ============================================================================
// Module: Gridsched Job State Translator
// Description: Normalize scheduling-job lifecycle into a schedule anchor or
//              a terminal outcome.
// Purpose: Give the retrieval path one deterministic answer per job state,
//          with a fallback to the device's last known event.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A retrieval request names an event reference whose scheduling job may be
//! anywhere in its asynchronous lifecycle, or may never have existed (for
//! example after a queue flush). This module translates that lifecycle into
//! either a schedule anchor start time or a terminal error. It is pure and
//! read-only: no state is mutated on any branch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

use crate::core::Device;
use crate::core::EventReference;
use crate::core::JobKey;
use crate::core::UdiEventError;
use crate::interfaces::JobState;
use crate::interfaces::JobStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Diagnostic default for failed jobs whose worker stored no cause.
const MISSING_CAUSE_DEFAULT: &str = "an unknown cause: the job does not state why it failed; \
     the worker may be missing an exception handler, or its exception handler \
     is not storing the failure cause as job metadata";

// ============================================================================
// SECTION: Schedule Anchor
// ============================================================================

/// Qualifier describing how the anchor was obtained, rendered as a prefix on
/// downstream messages.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorQualifier {
    /// Anchor came straight from a live job.
    None,
    /// No job existed; the device's last known event matched the reference.
    LastKnownEvent,
    /// The job already finished and was removed from active tracking.
    JobProcessed,
}

impl AnchorQualifier {
    /// Returns the message prefix for this qualifier.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::LastKnownEvent => {
                "your UDI event is the most recent event for this device, but "
            }
            Self::JobProcessed => {
                "a scheduling job has been processed based on your UDI event, but "
            }
        }
    }
}

/// Resolved schedule anchor for a retrieval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleAnchor {
    /// Start time of the schedule to assemble.
    pub start: OffsetDateTime,
    /// How the anchor was obtained.
    pub qualifier: AnchorQualifier,
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Determines the schedule anchor for `reference`, or short-circuits with a
/// terminal outcome.
///
/// When no job exists under `key`, falls back to the device's last known
/// event if the reference names it; a job-store lookup failure propagates as
/// [`UdiEventError::JobStoreUnavailable`] and never triggers the fallback.
///
/// # Errors
///
/// Returns [`UdiEventError::UnrecognizedEvent`] when neither a job nor a
/// matching last known event exists, [`UdiEventError::SchedulingFailed`] for
/// failed jobs, and [`UdiEventError::ScheduleNotReady`] for every
/// not-yet-finished state.
pub fn resolve_anchor(
    job_store: &dyn JobStore,
    device: &Device,
    reference: &EventReference,
    key: &JobKey,
) -> Result<ScheduleAnchor, UdiEventError> {
    let handle = job_store
        .fetch(key)
        .map_err(|error| UdiEventError::JobStoreUnavailable { message: error.to_string() })?;

    let Some(handle) = handle else {
        if device.last_event_id == Some(reference.event_id)
            && let Some(last_datetime) = device.last_event_datetime
        {
            return Ok(ScheduleAnchor {
                start: last_datetime,
                qualifier: AnchorQualifier::LastKnownEvent,
            });
        }
        return Err(UdiEventError::UnrecognizedEvent { event_id: reference.event_id });
    };

    match handle.state {
        JobState::Finished { start } => {
            Ok(ScheduleAnchor { start, qualifier: AnchorQualifier::JobProcessed })
        }
        JobState::Failed { cause } => Err(UdiEventError::SchedulingFailed {
            cause: cause.unwrap_or_else(|| MISSING_CAUSE_DEFAULT.to_owned()),
        }),
        JobState::Started => Err(UdiEventError::ScheduleNotReady {
            reason: "scheduling job in progress".to_owned(),
        }),
        JobState::Queued => Err(UdiEventError::ScheduleNotReady {
            reason: "scheduling job waiting to be processed".to_owned(),
        }),
        JobState::Deferred { prerequisite: None } => Err(UdiEventError::ScheduleNotReady {
            reason: "scheduling job waiting for unknown job to be processed".to_owned(),
        }),
        JobState::Deferred { prerequisite: Some(prerequisite) } => {
            Err(UdiEventError::ScheduleNotReady {
                reason: format!(
                    "scheduling job waiting for {} job \"{}\" to be processed",
                    prerequisite.status, prerequisite.id
                ),
            })
        }
        JobState::Other { status } => Err(UdiEventError::ScheduleNotReady {
            reason: format!("scheduling job has an unknown status: {status}"),
        }),
    }
}
