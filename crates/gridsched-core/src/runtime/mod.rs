// crates/gridsched-core/src/runtime/mod.rs
// ============================================================================
// Module: Gridsched Runtime
// Description: Event reconciliation and schedule-assembly runtime.
// Purpose: Group the runtime components and define the injected scheduling
//          policy.
// Dependencies: crate::core, time
// ============================================================================

//! ## Overview
//! The runtime hosts the five reconciliation components (job-state
//! translation, schedule assembly, event ordering, target-series building,
//! and scheduling dispatch), the validation pipeline, and the
//! [`UdiEventService`] that orchestrates them. Configuration reaches every
//! component as an explicit [`SchedulingPolicy`] value, never as ambient
//! global state.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod assembly;
pub mod dispatch;
pub mod memory;
pub mod ordering;
pub mod service;
pub mod status;
pub mod targets;
pub mod validate;

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Duration;

use crate::core::RESOLUTION;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assembly::assemble_schedule;
pub use dispatch::dispatch_and_commit;
pub use memory::InMemoryDeviceStore;
pub use memory::InMemoryJobStore;
pub use memory::InMemorySourceDirectory;
pub use memory::InMemoryTimeSeriesStore;
pub use memory::OpenAccess;
pub use memory::RecordingScheduler;
pub use ordering::validate_event_order;
pub use service::UdiEventService;
pub use status::AnchorQualifier;
pub use status::ScheduleAnchor;
pub use status::resolve_anchor;
pub use targets::build_target_series;

// ============================================================================
// SECTION: Operating Mode
// ============================================================================

/// Operating mode controlling event-ordering enforcement.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Ordering invariants enforced.
    #[default]
    Standard,
    /// All ordering checks bypassed, for replaying or simulating
    /// out-of-order events.
    Permissive,
}

// ============================================================================
// SECTION: Scheduling Policy
// ============================================================================

/// Scheduling policy injected into each runtime component call.
///
/// # Invariants
/// - `resolution` is the fixed 15-minute grid; `planning_horizon` is a
///   whole multiple of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingPolicy {
    /// Maximum forward window for schedules and targets.
    pub planning_horizon: Duration,
    /// Grid resolution for schedule and target series.
    pub resolution: Duration,
    /// Well-known label of the computation source that stores schedules.
    pub scheduler_label: String,
    /// Default schedule duration when a retrieval request names none.
    pub default_message_duration: Duration,
    /// Operating mode for ordering enforcement.
    pub mode: OperatingMode,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            planning_horizon: Duration::hours(48),
            resolution: RESOLUTION,
            scheduler_label: "schedule by gridsched".to_owned(),
            default_message_duration: Duration::hours(6),
            mode: OperatingMode::Standard,
        }
    }
}
