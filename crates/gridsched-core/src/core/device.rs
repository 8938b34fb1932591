// crates/gridsched-core/src/core/device.rs
// ============================================================================
// Module: Gridsched Device Model
// Description: Controllable device records and last-known-event state.
// Purpose: Carry the device class gate and the monotonic event bookkeeping
//          the ordering validator reads.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

//! ## Overview
//! A device is the unit of scheduling: one battery or charging station with
//! a last-known-event triple `(datetime, event id, SOC)`. The triple is
//! written only by the scheduling dispatcher after a fully validated
//! ingestion, and read by the retrieval path as the fallback anchor when no
//! live job exists for a reference.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::EventId;

// ============================================================================
// SECTION: Device Class
// ============================================================================

/// Device classes eligible for UDI-event scheduling.
///
/// Stored device records carry a free-form type label (the asset catalogue
/// knows more classes than the scheduler supports); the reference resolver
/// validates that label into this closed enumeration and rejects the rest.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Stationary battery.
    Battery,
    /// Electric-vehicle charging station.
    ChargingStation,
}

impl DeviceClass {
    /// Returns the stable wire label for the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::ChargingStation => "charging_station",
        }
    }

    /// Parses a stable wire label into a class.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "battery" => Some(Self::Battery),
            "charging_station" => Some(Self::ChargingStation),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Device Record
// ============================================================================

/// Device record with last-known-event state.
///
/// # Invariants
/// - `last_event_datetime` and `last_event_id` are monotonically
///   non-decreasing across accepted events outside permissive mode.
/// - Mutated only through [`DeviceUpdate`] after successful validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Asset identifier.
    pub asset_id: AssetId,
    /// Raw device type label from the asset catalogue; validated into
    /// [`DeviceClass`] by the reference resolver.
    pub device_type: String,
    /// Datetime of the most recent accepted event, if any.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_event_datetime: Option<OffsetDateTime>,
    /// Identifier of the most recent accepted event, if any.
    pub last_event_id: Option<EventId>,
    /// State of charge reported by the most recent accepted event, in MWh.
    pub last_soc_mwh: Option<f64>,
}

/// Last-known-state update committed after a successful dispatch.
///
/// # Invariants
/// - Applied atomically by the device store; a retrieval request never
///   observes a torn `(datetime, event id)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceUpdate {
    /// Datetime of the accepted event.
    pub datetime: OffsetDateTime,
    /// Identifier of the accepted event.
    pub event_id: EventId,
    /// State of charge at the event datetime, in MWh.
    pub soc_mwh: f64,
}
