//! Error type definitions.
//!
//! This module defines the fatal error types and the warning categories
//! counted while ingesting scan data.

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// A mandatory input file is absent.
///
/// Fatal: the run aborts before anything is written to the store.
#[derive(Error, Debug)]
#[error("Missing input for {source_name}: {}", path.display())]
pub struct MissingInputError {
    /// Human-readable name of the source (e.g. "parent pshtt scan")
    pub source_name: &'static str,
    /// Path that was expected to exist
    pub path: PathBuf,
}

/// A matched pshtt row lacks a mandatory field or carries an unparseable value.
///
/// Fatal for that single host only: the host is dropped from the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{hostname}] malformed scan row, field '{field}': {reason}")]
pub struct MalformedScanRowError {
    /// Host the row belongs to
    pub hostname: String,
    /// Offending column
    pub field: &'static str,
    /// What was wrong with it
    pub reason: String,
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A stored document could not be encoded or decoded.
    #[error("Document serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Schema migration failure.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Per-row anomalies absorbed during ingestion.
///
/// None of these stop a run; each is logged where it happens and counted
/// in [`IngestStats`](super::IngestStats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIterMacro)]
pub enum WarningType {
    /// Scan row for a host outside the domains list
    UntrackedHost,
    /// Subdomain scan row for a host missing from the gathered set
    UngatheredSubdomain,
    /// Subdomain scan row for a host already tracked as a parent domain
    ParentAsSubdomain,
    /// Cipher scan row with an empty marker field
    InvalidScanRow,
    /// Tracked parent with no pshtt row at all (removed from the catalog)
    UnclassifiableHost,
    /// pshtt row missing a mandatory field (host dropped)
    MalformedScanRow,
    /// Domains list or gathered-subdomains row too short to use
    MalformedInputRow,
    /// Data row seen before any header row in a header-keyed scan file
    HeaderlessRow,
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::UntrackedHost => "Untracked host",
            WarningType::UngatheredSubdomain => "Ungathered subdomain",
            WarningType::ParentAsSubdomain => "Parent domain in subdomain scan",
            WarningType::InvalidScanRow => "Invalid scan row",
            WarningType::UnclassifiableHost => "Unclassifiable host (removed)",
            WarningType::MalformedScanRow => "Malformed scan row (host dropped)",
            WarningType::MalformedInputRow => "Malformed input row",
            WarningType::HeaderlessRow => "Row before header",
        }
    }
}

impl std::fmt::Display for WarningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
