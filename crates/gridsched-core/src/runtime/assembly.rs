// crates/gridsched-core/src/runtime/assembly.rs
// ============================================================================
// Module: Gridsched Schedule Series Assembler
// Description: Assemble a trimmed, resolution-aligned schedule series from
//              stored computed values.
// Purpose: Never claim more schedule coverage than storage actually holds.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Given a schedule anchor and a requested duration, the assembler resolves
//! the computation source by its well-known label, queries the stored values
//! inside the window, and trims the result to the span that is actually
//! covered. Off-grid stored timestamps are a storage-layer bug and propagate
//! as-is; this module never rounds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;

use crate::core::Device;
use crate::core::SCHEDULE_UNIT;
use crate::core::ScheduleResult;
use crate::core::UdiEventError;
use crate::interfaces::SourceDirectory;
use crate::interfaces::TimeSeriesStore;
use crate::runtime::SchedulingPolicy;
use crate::runtime::status::ScheduleAnchor;

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Assembles the schedule series for `device` anchored at `anchor.start`.
///
/// The storage query window is the requested duration clamped to the
/// planning horizon. The returned duration is the lesser of the requested
/// duration and `last stored timestamp + resolution − start`.
///
/// # Errors
///
/// Returns [`UdiEventError::ScheduleNotFound`] when the computation source
/// label is unknown or no values exist inside the window (both messages
/// carry the anchor qualifier), and [`UdiEventError::StoreFailure`] when a
/// collaborator call fails.
pub fn assemble_schedule(
    series_store: &dyn TimeSeriesStore,
    sources: &dyn SourceDirectory,
    device: &Device,
    anchor: &ScheduleAnchor,
    requested: Duration,
    policy: &SchedulingPolicy,
) -> Result<ScheduleResult, UdiEventError> {
    let source_id = sources
        .lookup(&policy.scheduler_label)
        .map_err(|error| UdiEventError::StoreFailure { message: error.to_string() })?
        .ok_or_else(|| UdiEventError::ScheduleNotFound {
            message: format!(
                "{}no data is known labeled \"{}\"",
                anchor.qualifier.prefix(),
                policy.scheduler_label
            ),
        })?;

    let window = requested.min(policy.planning_horizon);
    let rows = series_store
        .query(device.asset_id, source_id, anchor.start, anchor.start + window)
        .map_err(|error| UdiEventError::StoreFailure { message: error.to_string() })?;

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(UdiEventError::ScheduleNotFound {
            message: format!(
                "{}the schedule was not found in storage",
                anchor.qualifier.prefix()
            ),
        });
    };

    let start = first.datetime;
    let duration = requested.min(last.datetime + policy.resolution - start);
    let cutoff = start + duration - policy.resolution;
    let values = rows
        .iter()
        .filter(|row| row.datetime <= cutoff)
        .map(|row| row.value_mw)
        .collect();

    Ok(ScheduleResult { values, start, duration, unit: SCHEDULE_UNIT })
}
