// crates/gridsched-core/src/core/series.rs
// ============================================================================
// Module: Gridsched Series Model
// Description: Computed schedule values, schedule results, and sparse target
//              series.
// Purpose: Carry the time-indexed data exchanged with the time-series store
//          and the scheduler queue.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

//! ## Overview
//! Three series-shaped types flow through the core. [`ComputedValue`] rows
//! are read-only observations written by the scheduler worker.
//! [`ScheduleResult`] is the trimmed, resolution-aligned output series built
//! fresh per retrieval request. [`TargetSeries`] is the sparse SOC-target
//! series built per ingestion: absence of a key means "no target", which is
//! deliberately distinct from a legitimate zero-valued target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::SourceId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Unit of assembled schedule values.
pub const SCHEDULE_UNIT: &str = "MW";

// ============================================================================
// SECTION: Computed Values
// ============================================================================

/// One observation of a computed schedule at a point in time.
///
/// # Invariants
/// - Immutable once written; the core never mutates stored values.
/// - `datetime` is expected to be grid-aligned by the writing worker; the
///   core propagates off-grid timestamps as-is rather than rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputedValue {
    /// Asset the value belongs to.
    pub asset_id: AssetId,
    /// Computation source that produced the value.
    pub source_id: SourceId,
    /// Timestamp of the observation.
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    /// Scheduled power in MW (positive = consumption).
    pub value_mw: f64,
}

// ============================================================================
// SECTION: Schedule Result
// ============================================================================

/// Assembled schedule series over `[start, start + duration)`.
///
/// # Invariants
/// - `values` are contiguous at the fixed resolution with no gaps.
/// - `duration` never exceeds the lesser of the requested duration and the
///   span of values actually present in storage.
/// - Constructed fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    /// Scheduled power values in timestamp order.
    pub values: Vec<f64>,
    /// Start of the covered window.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// Length of the covered window.
    pub duration: Duration,
    /// Unit of the values.
    pub unit: &'static str,
}

// ============================================================================
// SECTION: Target Series
// ============================================================================

/// Sparse SOC-target series over the right-closed window
/// `(start, start + horizon]`.
///
/// # Invariants
/// - An absent key means "no target"; presence is explicit, never a numeric
///   sentinel.
/// - Keys are stored at the series reference offset; insertion performs no
///   grid snapping.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSeries {
    /// Schedule start (exclusive lower bound of the target window).
    start: OffsetDateTime,
    /// End of the target window (inclusive upper bound).
    end: OffsetDateTime,
    /// Grid resolution of the series.
    resolution: Duration,
    /// Client-supplied target points, in MWh.
    points: BTreeMap<OffsetDateTime, f64>,
}

impl TargetSeries {
    /// Creates an everywhere-undefined target series for the window
    /// `(start, start + horizon]`.
    #[must_use]
    pub fn new(start: OffsetDateTime, horizon: Duration, resolution: Duration) -> Self {
        Self { start, end: start + horizon, resolution, points: BTreeMap::new() }
    }

    /// Returns the schedule start (exclusive lower bound).
    #[must_use]
    pub const fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// Returns the end of the target window (inclusive upper bound).
    #[must_use]
    pub const fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Returns the grid resolution of the series.
    #[must_use]
    pub const fn resolution(&self) -> Duration {
        self.resolution
    }

    /// Sets the target at `datetime`, normalized to the series reference
    /// offset. An exact timestamp collision overwrites: last write wins.
    pub fn set(&mut self, datetime: OffsetDateTime, soc_mwh: f64) {
        let normalized = datetime.to_offset(self.start.offset());
        self.points.insert(normalized, soc_mwh);
    }

    /// Returns the target at `datetime`, if one is set.
    #[must_use]
    pub fn get(&self, datetime: OffsetDateTime) -> Option<f64> {
        self.points.get(&datetime).copied()
    }

    /// Returns the number of set target points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the series is fully undefined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over set target points in timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (OffsetDateTime, f64)> + '_ {
        self.points.iter().map(|(datetime, value)| (*datetime, *value))
    }
}
