// crates/gridsched-core/src/runtime/targets.rs
// ============================================================================
// Module: Gridsched Target Series Builder
// Description: Build a sparse SOC-target series from client target points.
// Purpose: Validate each target point and place it in the right-closed
//          planning window without snapping.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Target points arrive as raw `(datetime, value)` pairs. Each is validated
//! in order and the first applicable error wins. Valid points land in a
//! sparse series at their exact timestamp, normalized to the series
//! reference offset so daylight-saving offsets cannot misalign comparisons.
//! An exact timestamp collision overwrites: last write wins. A plain SOC
//! event yields a fully undefined series.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

use crate::core::DatetimeError;
use crate::core::EventType;
use crate::core::SocUnit;
use crate::core::TargetRequest;
use crate::core::TargetSeries;
use crate::core::UdiEventError;
use crate::core::parse_event_datetime;
use crate::runtime::SchedulingPolicy;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds the SOC-target series for an event starting at `start`.
///
/// # Errors
///
/// Returns [`UdiEventError::IncompleteEvent`] when a soc-with-targets event
/// carries no targets, [`UdiEventError::IncompleteTarget`] for a target
/// without a value, and [`UdiEventError::InvalidDatetime`] /
/// [`UdiEventError::MissingTimezone`] for missing, unparsable, offset-less,
/// or out-of-window target datetimes.
pub fn build_target_series(
    start: OffsetDateTime,
    event_type: EventType,
    targets: Option<&[TargetRequest]>,
    unit: SocUnit,
    policy: &SchedulingPolicy,
) -> Result<TargetSeries, UdiEventError> {
    let mut series = TargetSeries::new(start, policy.planning_horizon, policy.resolution);

    if event_type == EventType::Soc {
        return Ok(series);
    }

    let Some(targets) = targets else {
        return Err(UdiEventError::IncompleteEvent {
            message: "cannot process a soc-with-targets event with missing targets".to_owned(),
        });
    };

    for target in targets {
        let Some(value) = target.value else {
            return Err(UdiEventError::IncompleteTarget {
                message: "target missing value parameter".to_owned(),
            });
        };

        let Some(raw_datetime) = target.datetime.as_deref() else {
            return Err(UdiEventError::InvalidDatetime {
                message: "target missing datetime parameter".to_owned(),
            });
        };

        let datetime = match parse_event_datetime(raw_datetime) {
            Ok(datetime) => datetime,
            Err(DatetimeError::Unparsable) => {
                return Err(UdiEventError::InvalidDatetime {
                    message: format!(
                        "cannot parse target datetime string {raw_datetime} as iso date"
                    ),
                });
            }
            Err(DatetimeError::MissingOffset) => {
                return Err(UdiEventError::MissingTimezone {
                    message: "target datetime should explicitly state a timezone".to_owned(),
                });
            }
        };

        if datetime > series.end() {
            return Err(UdiEventError::InvalidDatetime {
                message: format!(
                    "target datetime exceeds {}; maximum scheduling horizon is {}",
                    series.end(),
                    policy.planning_horizon
                ),
            });
        }
        if datetime <= series.start() {
            return Err(UdiEventError::InvalidDatetime {
                message: format!(
                    "target datetime must lie after the schedule start {}",
                    series.start()
                ),
            });
        }

        series.set(datetime, unit.to_mwh(value));
    }

    Ok(series)
}
