// crates/gridsched-core/src/runtime/validate.rs
// ============================================================================
// Module: Gridsched Validation Pipeline
// Description: Composable request-validation steps run before the core
//              components.
// Purpose: Refine raw client input step by step, returning the first
//          applicable tagged error.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! Each step takes raw or partially refined input and returns either a
//! refined value or one tagged [`UdiEventError`]. The service runs the steps
//! in sequence with `?`, so the first failure short-circuits the request; no
//! partial processing and no multi-error aggregation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;
use time::OffsetDateTime;
use tracing::warn;

use crate::core::AddressParseError;
use crate::core::DatetimeError;
use crate::core::Device;
use crate::core::DeviceClass;
use crate::core::EventReference;
use crate::core::SocUnit;
use crate::core::UdiEventError;
use crate::core::parse_event_datetime;
use crate::interfaces::AccessPolicy;
use crate::interfaces::DeviceStore;
use crate::runtime::SchedulingPolicy;

// ============================================================================
// SECTION: Reference Steps
// ============================================================================

/// Requires the event address field.
///
/// # Errors
///
/// Returns [`UdiEventError::IncompleteEvent`] when no address was sent.
pub fn require_event_address(event: Option<&str>) -> Result<&str, UdiEventError> {
    event.ok_or_else(|| UdiEventError::IncompleteEvent {
        message: "no event identifier sent".to_owned(),
    })
}

/// Parses the entity address into an event reference.
///
/// # Errors
///
/// Returns [`UdiEventError::InvalidReference`] for a malformed address and
/// [`UdiEventError::UnrecognizedEventType`] for a well-formed address naming
/// an unsupported event type.
pub fn parse_reference(address: &str) -> Result<EventReference, UdiEventError> {
    EventReference::parse(address).map_err(|error| match error {
        AddressParseError::Malformed => {
            warn!(address, "cannot parse event entity address");
            UdiEventError::InvalidReference { address: address.to_owned() }
        }
        AddressParseError::UnknownEventType(event_type) => {
            UdiEventError::UnrecognizedEventType { event_type }
        }
    })
}

/// Loads the referenced device and checks access and device class.
///
/// # Errors
///
/// Returns [`UdiEventError::UnrecognizedConnectionGroup`] when the device is
/// unknown or not accessible, [`UdiEventError::UnsupportedDeviceClass`] when
/// its class is outside the supported enumeration, and
/// [`UdiEventError::StoreFailure`] when the device store call fails.
pub fn resolve_device(
    devices: &dyn DeviceStore,
    access: &dyn AccessPolicy,
    reference: &EventReference,
) -> Result<Device, UdiEventError> {
    let device = devices
        .get(reference.asset_id)
        .map_err(|error| UdiEventError::StoreFailure { message: error.to_string() })?;

    let Some(device) = device.filter(|device| access.can_access(device)) else {
        warn!(asset_id = %reference.asset_id, "cannot identify an accessible device");
        return Err(UdiEventError::UnrecognizedConnectionGroup { asset_id: reference.asset_id });
    };

    if DeviceClass::from_label(&device.device_type).is_none() {
        return Err(UdiEventError::UnsupportedDeviceClass { asset_id: reference.asset_id });
    }

    Ok(device)
}

// ============================================================================
// SECTION: Field Steps
// ============================================================================

/// Requires and parses the event datetime, including an explicit offset.
///
/// # Errors
///
/// Returns [`UdiEventError::InvalidDatetime`] when the field is missing or
/// unparsable and [`UdiEventError::MissingTimezone`] when it lacks an
/// explicit offset.
pub fn require_event_datetime(datetime: Option<&str>) -> Result<OffsetDateTime, UdiEventError> {
    let Some(raw) = datetime else {
        return Err(UdiEventError::InvalidDatetime {
            message: "missing datetime parameter".to_owned(),
        });
    };
    match parse_event_datetime(raw) {
        Ok(datetime) => Ok(datetime),
        Err(DatetimeError::Unparsable) => Err(UdiEventError::InvalidDatetime {
            message: format!("cannot parse datetime string {raw} as iso date"),
        }),
        Err(DatetimeError::MissingOffset) => Err(UdiEventError::MissingTimezone {
            message: "datetime should explicitly state a timezone".to_owned(),
        }),
    }
}

/// Requires and parses the SOC unit field.
///
/// # Errors
///
/// Returns [`UdiEventError::IncompleteEvent`] when the unit is missing or
/// not one of kWh / MWh.
pub fn parse_soc_unit(unit: Option<&str>) -> Result<SocUnit, UdiEventError> {
    unit.and_then(SocUnit::from_label).ok_or_else(|| UdiEventError::IncompleteEvent {
        message: "unit must be kWh or MWh".to_owned(),
    })
}

/// Requires the SOC value field.
///
/// # Errors
///
/// Returns [`UdiEventError::IncompleteEvent`] when the value is missing.
pub fn require_soc_value(value: Option<f64>) -> Result<f64, UdiEventError> {
    value.ok_or_else(|| UdiEventError::IncompleteEvent {
        message: "missing value parameter".to_owned(),
    })
}

// ============================================================================
// SECTION: Duration Steps
// ============================================================================

/// Resolves the requested schedule duration, applying the policy default.
#[must_use]
pub fn resolve_requested_duration(
    requested: Option<Duration>,
    policy: &SchedulingPolicy,
) -> Duration {
    requested.unwrap_or(policy.default_message_duration)
}
