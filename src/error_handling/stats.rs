//! Ingestion statistics tracking.
//!
//! Counts the per-row anomalies absorbed during one pipeline run. The engine
//! is single-threaded, so plain counters behind `&mut self` are enough.

use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use super::types::WarningType;

/// Warning counters for one run.
///
/// All warning types are initialized to zero on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestStats {
    warnings: BTreeMap<WarningType, usize>,
}

impl IngestStats {
    pub fn new() -> Self {
        IngestStats {
            warnings: WarningType::iter().map(|w| (w, 0)).collect(),
        }
    }

    /// Increment a warning counter.
    pub fn increment(&mut self, warning: WarningType) {
        *self.warnings.entry(warning).or_insert(0) += 1;
    }

    /// Add `count` occurrences of a warning at once.
    pub fn add(&mut self, warning: WarningType, count: usize) {
        *self.warnings.entry(warning).or_insert(0) += count;
    }

    /// Get the count for a specific warning type.
    pub fn get(&self, warning: WarningType) -> usize {
        self.warnings.get(&warning).copied().unwrap_or(0)
    }

    /// Total of all warnings.
    pub fn total(&self) -> usize {
        self.warnings.values().sum()
    }

    /// Hosts dropped from the catalog, whether for lack of pshtt data or a
    /// malformed pshtt row. Each dropped host is counted once.
    pub fn removed_hosts(&self) -> usize {
        self.get(WarningType::UnclassifiableHost) + self.get(WarningType::MalformedScanRow)
    }

    /// Non-zero counters, in declaration order.
    pub fn non_zero(&self) -> impl Iterator<Item = (WarningType, usize)> + '_ {
        self.warnings
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(w, count)| (*w, *count))
    }
}

impl Default for IngestStats {
    fn default() -> Self {
        Self::new()
    }
}
