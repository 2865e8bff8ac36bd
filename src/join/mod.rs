//! Scan join layer.
//!
//! Matches pshtt and cipher scan rows to catalog hosts, for parents and
//! subdomains. Rows for hosts outside the catalog are logged and counted,
//! never fatal. Joining runs in a fixed order:
//!
//! 1. parent pshtt rows (mandatory source)
//! 2. removal of parents left without a usable pshtt row
//! 3. parent cipher rows
//! 4. subdomain pshtt rows, against the surviving parents
//! 5. subdomain cipher rows, against the stored subdomains
//!
//! Removing parents before the subdomain pass keeps every stored subdomain
//! attached to a tracked parent.

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};

use crate::catalog::Catalog;
use crate::config::{InputPaths, PSHTT_BASE_DOMAIN};
use crate::error_handling::{IngestStats, MissingInputError, WarningType};
use crate::load::{open_scan_rows, CsvSource, ScanRow, ScanRows};
use crate::models::HostRecord;
use crate::scan::{CipherScan, PshttScan};

/// A catalog host with its matched scan data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub record: HostRecord,
    pub pshtt: PshttScan,
    pub cipher: Option<CipherScan>,
}

impl HostEntry {
    fn new(mut record: HostRecord, pshtt: PshttScan) -> Self {
        record.live = pshtt.live;
        record.redirect = pshtt.redirect;
        record.canonical_url = pshtt.canonical_url.clone();
        record.preload_status = crate::classify::preload_status(&pshtt);
        Self {
            record,
            pshtt,
            cipher: None,
        }
    }
}

/// Output of the join: every classifiable host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Joined {
    /// Parents with pshtt data, by hostname
    pub parents: BTreeMap<String, HostEntry>,
    /// Live subdomains of surviving parents, by hostname
    pub subdomains: BTreeMap<String, HostEntry>,
}

/// Parses pshtt rows, keeping the last valid row per host.
///
/// Hosts whose last row is malformed end up in the returned set instead.
fn collect_pshtt<'r>(
    scanner: &str,
    rows: impl IntoIterator<Item = &'r ScanRow>,
) -> (BTreeMap<String, PshttScan>, BTreeSet<String>) {
    let mut scans = BTreeMap::new();
    let mut malformed = BTreeSet::new();
    for row in rows {
        match PshttScan::from_row(row) {
            Ok(scan) => {
                malformed.remove(&scan.hostname);
                scans.insert(scan.hostname.clone(), scan);
            }
            Err(e) => {
                warn!("[{}] {}", scanner, e);
                scans.remove(&e.hostname);
                malformed.insert(e.hostname);
            }
        }
    }
    (scans, malformed)
}

/// Validates one cipher row, counting incomplete and malformed rows.
fn parse_cipher(scanner: &str, row: &ScanRow, stats: &mut IngestStats) -> Option<CipherScan> {
    let hostname = row.hostname();
    if CipherScan::is_incomplete(row) {
        info!("[{}][{}] Skipping, scan data was invalid", scanner, hostname);
        stats.increment(WarningType::InvalidScanRow);
        return None;
    }
    match CipherScan::from_row(row) {
        Ok(scan) => Some(scan),
        Err(e) => {
            warn!("[{}] {}", scanner, e);
            stats.increment(WarningType::InvalidScanRow);
            None
        }
    }
}

fn count_headerless(rows: &ScanRows, stats: &mut IngestStats) {
    stats.add(WarningType::HeaderlessRow, rows.headerless_rows());
}

impl Joined {
    /// Matches parent pshtt rows to catalog domains, then removes every
    /// domain left without a usable row.
    pub fn join_parent_pshtt(
        catalog: &Catalog,
        rows: impl IntoIterator<Item = ScanRow>,
        stats: &mut IngestStats,
    ) -> Self {
        let mut tracked = Vec::new();
        for row in rows {
            let hostname = row.hostname();
            if catalog.domains.contains_key(&hostname) {
                tracked.push(row);
            } else {
                info!("[pshtt][{}] Skipping, not in the domains list", hostname);
                stats.increment(WarningType::UntrackedHost);
            }
        }
        let (mut scans, malformed) = collect_pshtt("pshtt", &tracked);

        // Collect removals first, then build the surviving map.
        let removed: Vec<&String> = catalog
            .domains
            .keys()
            .filter(|name| !scans.contains_key(*name))
            .collect();
        for name in &removed {
            if malformed.contains(*name) {
                warn!("[{}] Dropped, pshtt row is malformed", name);
                stats.increment(WarningType::MalformedScanRow);
            } else {
                warn!("[{}] No pshtt data for domain, removing it", name);
                stats.increment(WarningType::UnclassifiableHost);
            }
        }

        let parents = catalog
            .domains
            .iter()
            .filter_map(|(name, seed)| {
                scans
                    .remove(name)
                    .map(|scan| (name.clone(), HostEntry::new(seed.clone(), scan)))
            })
            .collect();

        Self {
            parents,
            subdomains: BTreeMap::new(),
        }
    }

    /// Attaches parent cipher scans.
    pub fn join_parent_cipher(
        &mut self,
        rows: impl IntoIterator<Item = ScanRow>,
        stats: &mut IngestStats,
    ) {
        for row in rows {
            let hostname = row.hostname();
            let Some(entry) = self.parents.get_mut(&hostname) else {
                info!("[sslyze][{}] Skipping, not a tracked domain", hostname);
                stats.increment(WarningType::UntrackedHost);
                continue;
            };
            if let Some(scan) = parse_cipher("sslyze", &row, stats) {
                entry.cipher = Some(scan);
            }
        }
    }

    /// Stores live subdomains that were gathered and belong to a surviving
    /// parent, and lists them on that parent.
    ///
    /// The parent hostname is read from the `Base Domain` column, or the
    /// second column when the header lacks it.
    /// Rows for hosts that are themselves tracked parents are skipped, so a
    /// hostname is stored at most once.
    pub fn join_subdomain_pshtt(
        &mut self,
        gathered: &BTreeMap<String, BTreeSet<String>>,
        rows: impl IntoIterator<Item = ScanRow>,
        stats: &mut IngestStats,
    ) {
        let mut tracked = Vec::new();
        for row in rows {
            let hostname = row.hostname();
            let parent = row
                .get(PSHTT_BASE_DOMAIN)
                .or_else(|| row.cell(1))
                .unwrap_or("")
                .trim()
                .to_lowercase();
            if self.parents.contains_key(&hostname) {
                info!("[pshtt][{}] Skipping, already tracked as a domain", hostname);
                stats.increment(WarningType::ParentAsSubdomain);
            } else if !gathered.contains_key(&hostname) {
                info!("[pshtt][{}] Skipping, not a gathered subdomain", hostname);
                stats.increment(WarningType::UngatheredSubdomain);
            } else if !self.parents.contains_key(&parent) {
                info!(
                    "[pshtt][{}] Skipping, parent {} is not a tracked domain",
                    hostname, parent
                );
                stats.increment(WarningType::UntrackedHost);
            } else {
                tracked.push((parent, row));
            }
        }

        let (scans, malformed) = collect_pshtt("pshtt", tracked.iter().map(|(_, row)| row));
        for name in &malformed {
            warn!("[{}] Dropped, pshtt row is malformed", name);
            stats.increment(WarningType::MalformedScanRow);
        }

        // The parent recorded with a host's last row is the one it keeps.
        let parent_of: BTreeMap<String, String> = tracked
            .into_iter()
            .map(|(parent, row)| (row.hostname(), parent))
            .collect();

        for (hostname, scan) in scans {
            if !scan.live {
                continue;
            }
            let (Some(parent_name), Some(sources)) =
                (parent_of.get(&hostname), gathered.get(&hostname))
            else {
                continue;
            };
            let Some(parent) = self.parents.get_mut(parent_name) else {
                continue;
            };

            let record = HostRecord::subdomain(&hostname, &parent.record, sources.clone());
            if !parent.record.subdomains.contains(&hostname) {
                parent.record.subdomains.push(hostname.clone());
            }
            self.subdomains
                .insert(hostname, HostEntry::new(record, scan));
        }
    }

    /// Attaches subdomain cipher scans to stored subdomains.
    pub fn join_subdomain_cipher(
        &mut self,
        rows: impl IntoIterator<Item = ScanRow>,
        stats: &mut IngestStats,
    ) {
        for row in rows {
            let hostname = row.hostname();
            let Some(entry) = self.subdomains.get_mut(&hostname) else {
                info!(
                    "[sslyze][{}] Skipping, no pshtt data saved for this host",
                    hostname
                );
                stats.increment(WarningType::UntrackedHost);
                continue;
            };
            if let Some(scan) = parse_cipher("sslyze", &row, stats) {
                entry.cipher = Some(scan);
            }
        }
    }
}

/// Opens an optional scan source and feeds its rows to `join`.
fn with_optional_rows(
    source: CsvSource<'_>,
    stats: &mut IngestStats,
    join: impl FnOnce(&mut ScanRows, &mut IngestStats),
) -> Result<(), MissingInputError> {
    if let Some(mut rows) = open_scan_rows(&source)? {
        join(&mut rows, stats);
        count_headerless(&rows, stats);
    }
    Ok(())
}

/// Runs every join against the scan files named in `inputs`.
///
/// # Errors
///
/// Returns `MissingInputError` if the parent pshtt scan cannot be opened.
/// The cipher scans and the subdomain pshtt scan are optional.
pub fn join_scans(
    catalog: &Catalog,
    inputs: &InputPaths,
    stats: &mut IngestStats,
) -> Result<Joined, MissingInputError> {
    let mut joined = match open_scan_rows(&CsvSource::mandatory(
        "parent pshtt scan",
        &inputs.parent_pshtt,
    ))? {
        Some(mut rows) => {
            let joined = Joined::join_parent_pshtt(catalog, rows.by_ref(), stats);
            count_headerless(&rows, stats);
            joined
        }
        None => Joined::default(),
    };

    with_optional_rows(
        CsvSource::optional("parent cipher scan", &inputs.parent_cipher),
        stats,
        |rows, stats| joined.join_parent_cipher(rows, stats),
    )?;
    with_optional_rows(
        CsvSource::optional("subdomain pshtt scan", &inputs.subdomain_pshtt),
        stats,
        |rows, stats| joined.join_subdomain_pshtt(&catalog.gathered, rows, stats),
    )?;
    with_optional_rows(
        CsvSource::optional("subdomain cipher scan", &inputs.subdomain_cipher),
        stats,
        |rows, stats| joined.join_subdomain_cipher(rows, stats),
    )?;

    info!(
        "Joined scans: {} domains, {} live subdomains",
        joined.parents.len(),
        joined.subdomains.len()
    );
    Ok(joined)
}
