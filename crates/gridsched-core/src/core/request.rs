// crates/gridsched-core/src/core/request.rs
// ============================================================================
// Module: Gridsched Request Surface
// Description: Client-facing request and response records for the two core
//              operations.
// Purpose: Carry raw client input into the validation pipeline and refined
//          results back out.
// Dependencies: crate::core::{event, identifiers, series}, serde, time
// ============================================================================

//! ## Overview
//! Request records keep every client-supplied field optional so the
//! validation pipeline can report the first missing or malformed field with
//! a precise error instead of failing shape-level deserialization. Response
//! records are fully refined and always serializable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::EventId;

// ============================================================================
// SECTION: SOC Units
// ============================================================================

/// Units accepted for client-supplied SOC values.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - Values are normalized to MWh at the validation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocUnit {
    /// Kilowatt hours.
    Kwh,
    /// Megawatt hours.
    Mwh,
}

impl SocUnit {
    /// Parses a stable wire label into a unit.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "kWh" => Some(Self::Kwh),
            "MWh" => Some(Self::Mwh),
            _ => None,
        }
    }

    /// Converts a value in this unit to MWh.
    #[must_use]
    pub fn to_mwh(self, value: f64) -> f64 {
        match self {
            Self::Kwh => value / 1000.0,
            Self::Mwh => value,
        }
    }
}

// ============================================================================
// SECTION: Ingestion Requests
// ============================================================================

/// One client-supplied SOC target point, unvalidated.
///
/// # Invariants
/// - Fields are optional so the target-series builder can report missing
///   fields with tagged errors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetRequest {
    /// Target SOC value in the request unit.
    pub value: Option<f64>,
    /// Target due datetime as an ISO 8601 string.
    pub datetime: Option<String>,
}

/// A UDI event submission, unvalidated.
///
/// # Invariants
/// - Fields are optional; the validation pipeline rejects the first missing
///   or malformed field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UdiEventRequest {
    /// Entity address of the event.
    pub event: Option<String>,
    /// Event datetime as an ISO 8601 string with explicit offset.
    pub datetime: Option<String>,
    /// SOC value at the event datetime, in the request unit.
    pub value: Option<f64>,
    /// Unit of `value` and of target values.
    pub unit: Option<String>,
    /// Future SOC targets (required for soc-with-targets events).
    pub targets: Option<Vec<TargetRequest>>,
}

/// Acknowledgment returned for an accepted UDI event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UdiEventAck {
    /// Asset the event was accepted for.
    pub asset_id: AssetId,
    /// Identifier of the accepted event.
    pub event_id: EventId,
}

// ============================================================================
// SECTION: Retrieval Requests
// ============================================================================

/// A device-message (schedule retrieval) request.
///
/// # Invariants
/// - `duration` is the client's requested window; the service clamps the
///   storage query to the configured planning horizon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceMessageRequest {
    /// Entity address of the event whose schedule is requested.
    pub event: Option<String>,
    /// Requested schedule duration; defaults to the service policy value.
    pub duration: Option<Duration>,
}

/// Assembled device message for a retrieval request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceMessage {
    /// Entity address the schedule answers.
    pub event: String,
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
