//! Application-level helpers used by the pipeline entry point.
//!
//! Currently just the summaries logged at the end of a run.

pub mod statistics;

// Re-export public API
pub use statistics::{percent, print_ingest_statistics, print_report, report_lines};
