// crates/gridsched-core/src/core/mod.rs
// ============================================================================
// Module: Gridsched Core Model
// Description: Canonical data model for devices, events, and schedule series.
// Purpose: Group the model submodules and re-export their public types.
// Dependencies: crate::core::{device, error, event, identifiers, request,
// series, time}
// ============================================================================

//! ## Overview
//! The core model captures everything the reconciliation runtime reads or
//! produces: device records with last-known-event state, parsed event
//! references, computed schedule values, schedule results, and sparse target
//! series. All types are plain data; behavior lives in [`crate::runtime`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod device;
pub mod error;
pub mod event;
pub mod identifiers;
pub mod request;
pub mod series;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use device::Device;
pub use device::DeviceClass;
pub use device::DeviceUpdate;
pub use error::UdiEventError;
pub use event::AddressParseError;
pub use event::EventReference;
pub use event::EventType;
pub use identifiers::AssetId;
pub use identifiers::EventId;
pub use identifiers::JobKey;
pub use identifiers::SourceId;
pub use request::DeviceMessage;
pub use request::DeviceMessageRequest;
pub use request::SocUnit;
pub use request::TargetRequest;
pub use request::UdiEventAck;
pub use request::UdiEventRequest;
pub use series::ComputedValue;
pub use series::SCHEDULE_UNIT;
pub use series::ScheduleResult;
pub use series::TargetSeries;
pub use time::DatetimeError;
pub use time::RESOLUTION;
pub use time::parse_event_datetime;
