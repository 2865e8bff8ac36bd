//! Domain and organization catalog.
//!
//! The domains list is the authority on which parent domains are tracked and
//! who owns them. The gathered-subdomains list says which subdomains were
//! discovered, and by which sources. Scan rows for anything outside these
//! two lists are ignored downstream.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::config::{
    InputPaths, DOMAINS_COLUMN_HOSTNAME, DOMAINS_COLUMN_ORGANIZATION_EN,
    DOMAINS_COLUMN_ORGANIZATION_FR, GATHERED_FIRST_SOURCE_COLUMN,
};
use crate::error_handling::{IngestStats, MissingInputError, WarningType};
use crate::load::{open_records, parse_flag, CsvSource};
use crate::models::{HostRecord, OrganizationRecord};

/// Seed catalog built from the two input lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Tracked parent domains by hostname
    pub domains: BTreeMap<String, HostRecord>,
    /// Organizations by slug
    pub organizations: BTreeMap<String, OrganizationRecord>,
    /// Gathered subdomains and the sources that found them
    pub gathered: BTreeMap<String, BTreeSet<String>>,
}

/// Lowercases and trims a hostname.
pub fn normalize_hostname(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// URL-safe slug of an organization name.
///
/// Accented Latin letters are transliterated, every other run of
/// non-alphanumeric characters becomes a single dash.
///
/// ```
/// use https_tracker::catalog::slugify;
/// assert_eq!(slugify("Agence du revenu du Canada"), "agence-du-revenu-du-canada");
/// assert_eq!(slugify("Santé Canada"), "sante-canada");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        match transliterate(ch) {
            Some(ascii) => slug.push_str(ascii),
            None if ch.is_ascii_alphanumeric() => slug.push(ch.to_ascii_lowercase()),
            None => slug.push('-'),
        }
    }

    slug.split('-')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' | 'À' | 'Á' | 'Â' | 'Ä' | 'Ã' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'ö' | 'õ' | 'Ò' | 'Ó' | 'Ô' | 'Ö' | 'Õ' => "o",
        'œ' | 'Œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        _ => return None,
    };
    Some(ascii)
}

impl Catalog {
    /// Adds domains-list records.
    ///
    /// The first row for a hostname wins; later duplicates only count
    /// towards their organization's `total_domains`.
    pub fn add_domains(
        &mut self,
        records: impl IntoIterator<Item = Vec<String>>,
        parent_source: &str,
        stats: &mut IngestStats,
    ) {
        for record in records {
            if record.len() <= DOMAINS_COLUMN_ORGANIZATION_FR {
                warn!(
                    "[domains] Skipping row with {} columns: {:?}",
                    record.len(),
                    record
                );
                stats.increment(WarningType::MalformedInputRow);
                continue;
            }

            let hostname = normalize_hostname(&record[DOMAINS_COLUMN_HOSTNAME]);
            let name_en = record[DOMAINS_COLUMN_ORGANIZATION_EN].trim();
            let name_fr = record[DOMAINS_COLUMN_ORGANIZATION_FR].trim();
            if hostname.is_empty() {
                stats.increment(WarningType::MalformedInputRow);
                continue;
            }

            let slug = slugify(name_en);
            let organization = self
                .organizations
                .entry(slug.clone())
                .or_insert_with(|| OrganizationRecord::new(&slug, name_en, name_fr));
            organization.total_domains += 1;

            if self.domains.contains_key(&hostname) {
                debug!("[domains] Duplicate row for {}, keeping the first", hostname);
                continue;
            }
            let record = HostRecord::parent(&hostname, organization, parent_source);
            self.domains.insert(hostname, record);
        }
    }

    /// Adds gathered-subdomain records.
    ///
    /// Source flag columns follow the hostname and an unused column, in the
    /// order of `gatherers`. A missing flag column counts as false.
    pub fn add_gathered(
        &mut self,
        records: impl IntoIterator<Item = Vec<String>>,
        gatherers: &[String],
        stats: &mut IngestStats,
    ) {
        for record in records {
            let hostname = normalize_hostname(record.first().map(String::as_str).unwrap_or(""));
            if hostname.is_empty() {
                stats.increment(WarningType::MalformedInputRow);
                continue;
            }
            if self.gathered.contains_key(&hostname) {
                continue;
            }

            let sources = gatherers
                .iter()
                .enumerate()
                .filter(|(i, _)| {
                    record
                        .get(GATHERED_FIRST_SOURCE_COLUMN + i)
                        .and_then(|cell| parse_flag(cell))
                        .unwrap_or(false)
                })
                .map(|(_, name)| name.clone())
                .collect();
            self.gathered.insert(hostname, sources);
        }
    }
}

/// Builds the catalog from the domains list and, if present, the
/// gathered-subdomains list.
///
/// # Errors
///
/// Returns `MissingInputError` if the domains list cannot be opened.
pub fn build_catalog(
    inputs: &InputPaths,
    gatherers: &[String],
    parent_source: &str,
    stats: &mut IngestStats,
) -> Result<Catalog, MissingInputError> {
    let mut catalog = Catalog::default();

    let domains = open_records(&CsvSource::mandatory("domains list", &inputs.domains))?;
    if let Some(records) = domains {
        catalog.add_domains(records, parent_source, stats);
    }

    let gathered = open_records(&CsvSource::optional(
        "gathered subdomains",
        &inputs.gathered_subdomains,
    ))?;
    if let Some(records) = gathered {
        catalog.add_gathered(records, gatherers, stats);
    }

    info!(
        "Catalog: {} domains, {} organizations, {} gathered subdomains",
        catalog.domains.len(),
        catalog.organizations.len(),
        catalog.gathered.len()
    );
    Ok(catalog)
}
