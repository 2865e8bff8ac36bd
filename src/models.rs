//! Published documents: hosts, organizations and the government-wide report.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainTotals, ReportTotals};
use crate::classify::{ComplianceVerdict, PreloadStatus};
use crate::storage::{Collection, Document};

/// A tracked parent domain or one of its subdomains.
///
/// Parents carry `base_domain == hostname`. A host is eligible for HTTPS
/// reporting exactly when it has a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub hostname: String,
    pub base_domain: String,
    pub organization_slug: String,
    pub organization_name_en: String,
    pub organization_name_fr: String,
    pub is_parent: bool,
    pub sources: BTreeSet<String>,
    pub live: bool,
    pub redirect: bool,
    pub canonical_url: String,
    /// Present only for live hosts
    pub https: Option<ComplianceVerdict>,
    /// From the host's own pshtt data, whether or not it is live
    pub preload_status: PreloadStatus,
    /// Parent is live or has at least one live subdomain
    #[serde(default)]
    pub eligible_zone: bool,
    /// Live subdomains, parents only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdomains: Vec<String>,
    /// Parent plus subdomain rollups, parents only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<DomainTotals>,
}

impl HostRecord {
    /// Seed record for a parent domain read from the domains list.
    pub fn parent(hostname: &str, organization: &OrganizationRecord, source: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            base_domain: hostname.to_string(),
            organization_slug: organization.slug.clone(),
            organization_name_en: organization.name_en.clone(),
            organization_name_fr: organization.name_fr.clone(),
            is_parent: true,
            sources: BTreeSet::from([source.to_string()]),
            live: false,
            redirect: false,
            canonical_url: String::new(),
            https: None,
            preload_status: PreloadStatus::No,
            eligible_zone: false,
            subdomains: Vec::new(),
            totals: None,
        }
    }

    /// Seed record for a subdomain, inheriting its parent's organization.
    pub fn subdomain(hostname: &str, parent: &HostRecord, sources: BTreeSet<String>) -> Self {
        Self {
            hostname: hostname.to_string(),
            base_domain: parent.hostname.clone(),
            organization_slug: parent.organization_slug.clone(),
            organization_name_en: parent.organization_name_en.clone(),
            organization_name_fr: parent.organization_name_fr.clone(),
            is_parent: false,
            sources,
            live: false,
            redirect: false,
            canonical_url: String::new(),
            https: None,
            preload_status: PreloadStatus::No,
            eligible_zone: false,
            subdomains: Vec::new(),
            totals: None,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.https.is_some()
    }

    pub fn has_crypto_data(&self) -> bool {
        self.https.as_ref().is_some_and(ComplianceVerdict::has_crypto_data)
    }
}

/// An organization owning one or more parent domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub slug: String,
    pub name_en: String,
    pub name_fr: String,
    /// Rows naming this organization in the domains list, duplicates included
    pub total_domains: usize,
    #[serde(flatten)]
    pub totals: ReportTotals,
}

impl OrganizationRecord {
    pub fn new(slug: &str, name_en: &str, name_fr: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name_en: name_en.to_string(),
            name_fr: name_fr.to_string(),
            total_domains: 0,
            totals: ReportTotals::default(),
        }
    }
}

/// Government-wide totals for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub report_date: String,
    #[serde(flatten)]
    pub totals: ReportTotals,
}

/// Everything one run publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub organizations: Vec<OrganizationRecord>,
    /// Parents in name order, then subdomains in name order
    pub hosts: Vec<HostRecord>,
    pub report: Report,
}

impl Document for HostRecord {
    const COLLECTION: Collection = Collection::Domains;

    fn key(&self) -> &str {
        &self.hostname
    }

    fn ref_key(&self) -> Option<&str> {
        Some(&self.organization_slug)
    }
}

impl Document for OrganizationRecord {
    const COLLECTION: Collection = Collection::Organizations;

    fn key(&self) -> &str {
        &self.slug
    }
}

impl Document for Report {
    const COLLECTION: Collection = Collection::Reports;

    fn key(&self) -> &str {
        &self.report_date
    }
}
