//! Error handling and ingestion statistics.
//!
//! This module provides:
//! - Fatal error types (`MissingInputError`, database and logger errors)
//! - The per-host `MalformedScanRowError`
//! - Warning categories and their counters
//!
//! Only a missing mandatory input halts a run. Every per-row anomaly is
//! logged, counted, and skipped.

mod stats;
mod types;

// Re-export public API
pub use stats::IngestStats;
pub use types::{
    DatabaseError, InitializationError, MalformedScanRowError, MissingInputError, WarningType,
};
