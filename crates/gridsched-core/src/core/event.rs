// crates/gridsched-core/src/core/event.rs
// ============================================================================
// Module: Gridsched Event References
// Description: Parsed UDI event references and event types.
// Purpose: Resolve an opaque event address into the three fields the core
//          interprets.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Clients identify events with a colon-separated entity address. The core
//! treats everything before the final three segments as opaque routing
//! information; only the trailing `asset_id:event_id:event_type` triple is
//! interpreted. A parsed [`EventReference`] is immutable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::EventId;

// ============================================================================
// SECTION: Event Type
// ============================================================================

/// UDI event types accepted by the core.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// SOC snapshot at the event datetime.
    Soc,
    /// SOC snapshot plus future SOC targets.
    SocWithTargets,
}

impl EventType {
    /// Returns the stable wire label for the event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Soc => "soc",
            Self::SocWithTargets => "soc-with-targets",
        }
    }

    /// Parses a stable wire label into an event type.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "soc" => Some(Self::Soc),
            "soc-with-targets" => Some(Self::SocWithTargets),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Address Parsing
// ============================================================================

/// Failures while parsing an entity address.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// The address does not yield the trailing
    /// `asset_id:event_id:event_type` triple.
    #[error("malformed entity address")]
    Malformed,
    /// The address is well-formed but names an unsupported event type.
    #[error("unrecognized event type: {0}")]
    UnknownEventType(String),
}

// ============================================================================
// SECTION: Event Reference
// ============================================================================

/// Parsed event reference.
///
/// # Invariants
/// - Immutable once parsed.
/// - `event_id` is the ordering key the ordering validator compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReference {
    /// Asset identifier the event addresses.
    pub asset_id: AssetId,
    /// Client-chosen event identifier.
    pub event_id: EventId,
    /// Event type.
    pub event_type: EventType,
}

impl EventReference {
    /// Parses an entity address into an event reference.
    ///
    /// The address format is opaque except for its final three
    /// colon-separated segments: `…:<asset_id>:<event_id>:<event_type>`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressParseError::Malformed`] when the address does not
    /// yield all three fields, and [`AddressParseError::UnknownEventType`]
    /// when the trailing segment is not a supported event type.
    pub fn parse(address: &str) -> Result<Self, AddressParseError> {
        let mut segments = address.rsplit(':');
        let type_label = segments.next().ok_or(AddressParseError::Malformed)?;
        let event_id = segments
            .next()
            .and_then(|segment| segment.parse().ok())
            .map(EventId::new)
            .ok_or(AddressParseError::Malformed)?;
        let asset_id = segments
            .next()
            .and_then(|segment| segment.parse().ok())
            .and_then(AssetId::from_raw)
            .ok_or(AddressParseError::Malformed)?;
        // At least one leading scheme segment must remain.
        if segments.next().is_none() {
            return Err(AddressParseError::Malformed);
        }
        let event_type = EventType::from_label(type_label)
            .ok_or_else(|| AddressParseError::UnknownEventType(type_label.to_owned()))?;
        Ok(Self { asset_id, event_id, event_type })
    }
}
