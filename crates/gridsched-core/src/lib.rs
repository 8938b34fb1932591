// crates/gridsched-core/src/lib.rs
// ============================================================================
// Module: Gridsched Core Library
// Description: Event reconciliation and schedule-assembly core for
//              demand-flexibility scheduling of controllable energy devices.
// Purpose: Expose the data model, collaborator interfaces, and runtime.
// Dependencies: serde, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! Gridsched Core implements the ingestion and retrieval path of a
//! demand-flexibility scheduling API. Clients submit UDI events (state-of-
//! charge snapshots, optionally carrying future SOC targets) and later poll
//! for the resulting charge/discharge schedule. The core reconciles the
//! asynchronous lifecycle of scheduling jobs into deterministic outcomes,
//! assembles resolution-aligned schedule series from stored computed values,
//! enforces event-ordering invariants, and dispatches scheduling jobs.
//!
//! External collaborators (device store, job store, time-series store,
//! computation-source directory, scheduler queue) are reached only through
//! the traits in [`interfaces`]; the core spawns no threads and performs no
//! computation of its own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::AssetId;
pub use core::ComputedValue;
pub use core::Device;
pub use core::DeviceClass;
pub use core::DeviceMessage;
pub use core::DeviceMessageRequest;
pub use core::DeviceUpdate;
pub use core::EventId;
pub use core::EventReference;
pub use core::EventType;
pub use core::JobKey;
pub use core::RESOLUTION;
pub use core::SCHEDULE_UNIT;
pub use core::ScheduleResult;
pub use core::SocUnit;
pub use core::SourceId;
pub use core::TargetRequest;
pub use core::TargetSeries;
pub use core::UdiEventAck;
pub use core::UdiEventError;
pub use core::UdiEventRequest;
pub use interfaces::AccessPolicy;
pub use interfaces::DeviceStore;
pub use interfaces::DispatchError;
pub use interfaces::JobHandle;
pub use interfaces::JobState;
pub use interfaces::JobStore;
pub use interfaces::JobStoreError;
pub use interfaces::PrerequisiteJob;
pub use interfaces::ScheduleJobRequest;
pub use interfaces::SchedulerDispatch;
pub use interfaces::SourceDirectory;
pub use interfaces::StoreError;
pub use interfaces::TimeSeriesStore;
