// crates/gridsched-core/src/core/time.rs
// ============================================================================
// Module: Gridsched Time Model
// Description: Schedule resolution and strict event-datetime parsing.
// Purpose: Keep schedule and target series on one fixed 15-minute grid and
//          reject datetimes without an explicit UTC offset.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Every schedule and target series in Gridsched runs at a fixed 15-minute
//! resolution. Event datetimes arrive as ISO 8601 strings and must state an
//! explicit UTC offset; an offset-less datetime is ambiguous around DST
//! transitions and is rejected rather than defaulted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::well_known::Iso8601;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Fixed resolution for all schedule and target series.
pub const RESOLUTION: Duration = Duration::minutes(15);

// ============================================================================
// SECTION: Datetime Parsing
// ============================================================================

/// Outcome of strict event-datetime parsing.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeError {
    /// The string is not a parsable ISO 8601 datetime.
    Unparsable,
    /// The string parses as a datetime but carries no UTC offset.
    MissingOffset,
}

/// Parses an ISO 8601 datetime string, requiring an explicit UTC offset.
///
/// # Errors
///
/// Returns [`DatetimeError::MissingOffset`] when the string is a valid
/// datetime without an offset, and [`DatetimeError::Unparsable`] otherwise.
pub fn parse_event_datetime(raw: &str) -> Result<OffsetDateTime, DatetimeError> {
    if let Ok(datetime) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Ok(datetime);
    }
    // Offset-less strings parse as a naive datetime; treat them separately so
    // the caller can point the client at the missing timezone.
    if PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).is_ok() {
        return Err(DatetimeError::MissingOffset);
    }
    Err(DatetimeError::Unparsable)
}
