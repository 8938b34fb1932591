// crates/gridsched-store-sqlite/src/lib.rs
// ============================================================================
// Module: Gridsched SQLite Store Library
// Description: Durable collaborator stores backed by SQLite WAL.
// Purpose: Persist device state, computation sources, and computed values.
// Dependencies: gridsched-core, rusqlite
// ============================================================================

//! ## Overview
//! `gridsched-store-sqlite` implements the device store, the computation
//! source directory, and the computed-value time-series store over a single
//! `SQLite` database. Writes run inside transactions and all errors map into
//! the core store error type, failing closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
