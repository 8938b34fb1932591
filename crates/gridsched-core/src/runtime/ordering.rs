// crates/gridsched-core/src/runtime/ordering.rs
// ============================================================================
// Module: Gridsched Event Ordering Validator
// Description: Monotonicity checks for incoming UDI events.
// Purpose: Keep accepted events ordered by datetime and event id per device.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Accepted events move a device's last-known state forward, never backward.
//! An event dated before the last known event is stale; an event id that
//! does not strictly exceed the last known id is outdated (ties count as
//! stale). Permissive mode bypasses both checks so out-of-order events can
//! be replayed in simulations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

use crate::core::Device;
use crate::core::EventId;
use crate::core::UdiEventError;
use crate::runtime::OperatingMode;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Decides acceptance of a newly submitted `(datetime, event id)` pair
/// against the device's stored last known state. Read-only.
///
/// # Errors
///
/// Outside permissive mode, returns [`UdiEventError::StaleDatetime`] when
/// `datetime` precedes the last known event datetime, and
/// [`UdiEventError::OutdatedEventId`] when `event_id` does not strictly
/// exceed the last known event id.
pub fn validate_event_order(
    device: &Device,
    datetime: OffsetDateTime,
    event_id: EventId,
    mode: OperatingMode,
) -> Result<(), UdiEventError> {
    if mode == OperatingMode::Permissive {
        return Ok(());
    }

    if let Some(last_known) = device.last_event_datetime
        && datetime < last_known
    {
        return Err(UdiEventError::StaleDatetime { submitted: datetime, last_known });
    }

    if let Some(last_known) = device.last_event_id
        && last_known >= event_id
    {
        return Err(UdiEventError::OutdatedEventId { event_id, last_known });
    }

    Ok(())
}
