// crates/gridsched-core/src/core/error.rs
// ============================================================================
// Module: Gridsched Error Taxonomy
// Description: Terminal, request-scoped error outcomes for the core.
// Purpose: Give the boundary layer one tagged error per failure with a
//          human-readable message.
// Dependencies: crate::core::identifiers, thiserror, time
// ============================================================================

//! ## Overview
//! Every validation or reconciliation failure returns immediately with the
//! first applicable error; there is no multi-error aggregation and no retry
//! inside the core. Variants are stable so the boundary layer can map them
//! to response codes programmatically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::EventId;

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Terminal outcomes for UDI-event ingestion and schedule retrieval.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages carry enough context (asset id, event id) to diagnose without
///   re-deriving state.
#[derive(Debug, Error)]
pub enum UdiEventError {
    /// The event address is malformed or unparsable.
    #[error("cannot parse event address: {address}")]
    InvalidReference {
        /// Raw address as submitted.
        address: String,
    },
    /// The device is unknown or the caller may not access it.
    #[error("cannot identify a connection group for asset {asset_id}")]
    UnrecognizedConnectionGroup {
        /// Asset identifier from the event reference.
        asset_id: AssetId,
    },
    /// The device class is outside the supported enumeration.
    #[error("asset {asset_id} is not a battery or charging station")]
    UnsupportedDeviceClass {
        /// Asset identifier from the event reference.
        asset_id: AssetId,
    },
    /// The event type is outside the supported enumeration.
    #[error("unrecognized event type: {event_type}")]
    UnrecognizedEventType {
        /// Raw event type label as submitted.
        event_type: String,
    },
    /// No job exists for the reference and it is not the device's last
    /// known event.
    #[error("unrecognized event id {event_id}: no scheduling job and no matching last known event")]
    UnrecognizedEvent {
        /// Event identifier from the reference.
        event_id: EventId,
    },
    /// A job exists but has not produced a result yet.
    #[error("schedule not ready: {reason}")]
    ScheduleNotReady {
        /// Human-readable job-state description.
        reason: String,
    },
    /// The job completed with a failure.
    #[error("scheduling job failed with {cause}")]
    SchedulingFailed {
        /// Failure cause stored by the worker, or a diagnostic default.
        cause: String,
    },
    /// The job finished (or the fallback matched) but no computed source or
    /// values exist in storage.
    #[error("unknown schedule: {message}")]
    ScheduleNotFound {
        /// Detail message, prefixed with the anchor qualifier when present.
        message: String,
    },
    /// A datetime on the event or a target is missing or malformed.
    #[error("invalid datetime: {message}")]
    InvalidDatetime {
        /// Detail message naming the offending field.
        message: String,
    },
    /// A datetime lacks an explicit UTC offset.
    #[error("invalid timezone: {message}")]
    MissingTimezone {
        /// Detail message naming the offending field.
        message: String,
    },
    /// The event datetime precedes the device's last known event datetime.
    #[error(
        "the date of the requested UDI event ({submitted}) is earlier than the latest known date ({last_known})"
    )]
    StaleDatetime {
        /// Submitted event datetime.
        submitted: OffsetDateTime,
        /// Latest known event datetime for the device.
        last_known: OffsetDateTime,
    },
    /// The event identifier does not exceed the device's last known one.
    #[error("event id {event_id} is not higher than the latest known event id {last_known}")]
    OutdatedEventId {
        /// Submitted event identifier.
        event_id: EventId,
        /// Latest known event identifier for the device.
        last_known: EventId,
    },
    /// A target point is missing a required field.
    #[error("incomplete target: {message}")]
    IncompleteTarget {
        /// Detail message naming the missing field.
        message: String,
    },
    /// The event is missing a required field.
    #[error("incomplete event: {message}")]
    IncompleteEvent {
        /// Detail message naming the missing field.
        message: String,
    },
    /// The job store could not be reached. Distinct from a clean
    /// "no such job", which triggers the last-known-event fallback instead.
    #[error("job store unavailable: {message}")]
    JobStoreUnavailable {
        /// Underlying lookup failure.
        message: String,
    },
    /// A device, source, or time-series store call failed.
    #[error("store failure: {message}")]
    StoreFailure {
        /// Underlying store failure.
        message: String,
    },
    /// The scheduler queue rejected the job submission.
    #[error("scheduling dispatch failed: {message}")]
    DispatchFailed {
        /// Underlying dispatch failure.
        message: String,
    },
}
