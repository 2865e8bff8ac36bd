//! Aggregation engine.
//!
//! Folds per-host verdicts into three totals shapes. Each shape has its own
//! population:
//! - HTTPS: every eligible (live) host
//! - crypto: eligible hosts whose verdict used cipher scan data
//! - preloading: every tracked parent domain, live or not
//!
//! The same folds run per domain, per organization and government-wide.
//! Totals are always rebuilt from the full host list; nothing carries over
//! between runs.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::classify::{
    Classifier, ComplianceVerdict, CryptoStatus, Enforcement, Hsts, PreloadStatus,
};
use crate::join::Joined;
use crate::models::{HostRecord, OrganizationRecord, Report};

/// Shared view of the three totals shapes, used for printing and checks.
pub trait Totals {
    /// Size of the population.
    fn eligible(&self) -> usize;

    /// `(criterion, count)` pairs, in display order.
    fn criteria(&self) -> Vec<(&'static str, usize)>;
}

/// HTTPS and HSTS rollup over eligible hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpsTotals {
    pub eligible: usize,
    /// HTTPS served, chain issues allowed
    pub uses: usize,
    /// Enforcement of Yes or stricter
    pub enforces: usize,
    /// HSTS of Yes, directly or via preloading
    pub hsts: usize,
    pub meets_policy_a: usize,
    pub meets_policy_b: usize,
}

impl HttpsTotals {
    pub fn add(&mut self, verdict: &ComplianceVerdict) {
        self.eligible += 1;
        self.uses += usize::from(verdict.uses_https.code() >= 1);
        self.enforces += usize::from(verdict.enforcement >= Enforcement::Yes);
        self.hsts += usize::from(verdict.hsts >= Hsts::Yes);
        self.meets_policy_a += usize::from(verdict.meets_policy_a());
        self.meets_policy_b += usize::from(verdict.meets_policy_b());
    }

    pub fn from_verdicts<'a>(verdicts: impl IntoIterator<Item = &'a ComplianceVerdict>) -> Self {
        verdicts.into_iter().fold(Self::default(), |mut totals, v| {
            totals.add(v);
            totals
        })
    }
}

impl Totals for HttpsTotals {
    fn eligible(&self) -> usize {
        self.eligible
    }

    fn criteria(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("uses", self.uses),
            ("enforces", self.enforces),
            ("hsts", self.hsts),
            ("meets_policy_a", self.meets_policy_a),
            ("meets_policy_b", self.meets_policy_b),
        ]
    }
}

/// Cipher and protocol rollup over hosts with cipher scan data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CryptoTotals {
    pub eligible: usize,
    /// No legacy protocol or weak cipher offered
    pub passes: usize,
    pub rc4: usize,
    #[serde(rename = "3des")]
    pub triple_des: usize,
    pub sslv2: usize,
    pub sslv3: usize,
}

impl CryptoTotals {
    /// Adds one verdict. Verdicts without cipher data are not part of the
    /// population and are ignored.
    pub fn add(&mut self, verdict: &ComplianceVerdict) {
        let Some(weak) = verdict.weak_ciphers else {
            return;
        };
        self.eligible += 1;
        self.passes += usize::from(verdict.crypto_status == CryptoStatus::Passes);
        self.rc4 += usize::from(weak.rc4);
        self.triple_des += usize::from(weak.triple_des);
        self.sslv2 += usize::from(weak.sslv2);
        self.sslv3 += usize::from(weak.sslv3);
    }

    pub fn from_verdicts<'a>(verdicts: impl IntoIterator<Item = &'a ComplianceVerdict>) -> Self {
        verdicts.into_iter().fold(Self::default(), |mut totals, v| {
            totals.add(v);
            totals
        })
    }
}

impl Totals for CryptoTotals {
    fn eligible(&self) -> usize {
        self.eligible
    }

    fn criteria(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("passes", self.passes),
            ("rc4", self.rc4),
            ("3des", self.triple_des),
            ("sslv2", self.sslv2),
            ("sslv3", self.sslv3),
        ]
    }
}

/// Preload-list rollup over parent domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreloadTotals {
    pub eligible: usize,
    pub preloaded: usize,
    pub preload_ready: usize,
}

impl PreloadTotals {
    pub fn add(&mut self, status: PreloadStatus) {
        self.eligible += 1;
        match status {
            PreloadStatus::Yes => self.preloaded += 1,
            PreloadStatus::ReadyForSubmission => self.preload_ready += 1,
            PreloadStatus::No => {}
        }
    }
}

impl Totals for PreloadTotals {
    fn eligible(&self) -> usize {
        self.eligible
    }

    fn criteria(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("preloaded", self.preloaded),
            ("preload_ready", self.preload_ready),
        ]
    }
}

/// Totals stored on each parent domain, covering it and its subdomains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainTotals {
    pub https: HttpsTotals,
    pub crypto: CryptoTotals,
}

/// The three rollups for an organization or the whole government.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportTotals {
    pub https: HttpsTotals,
    pub crypto: CryptoTotals,
    pub preloading: PreloadTotals,
}

impl ReportTotals {
    /// Folds a set of hosts into all three rollups.
    pub fn summarize<'a>(hosts: impl IntoIterator<Item = &'a HostRecord>) -> Self {
        let mut totals = Self::default();
        for host in hosts {
            if let Some(verdict) = &host.https {
                totals.https.add(verdict);
                totals.crypto.add(verdict);
            }
            if host.is_parent {
                totals.preloading.add(host.preload_status);
            }
        }
        totals
    }

    /// Sections in display order.
    pub fn sections(&self) -> [(&'static str, &dyn Totals); 3] {
        [
            ("https", &self.https),
            ("crypto", &self.crypto),
            ("preloading", &self.preloading),
        ]
    }
}

/// Classifies every joined host and computes per-domain totals.
///
/// Subdomains are classified first so that a parent zone with live
/// subdomains is zone-eligible even when the parent itself is not live.
/// Returns parents in name order followed by subdomains in name order.
pub fn process_domains(joined: Joined, classifier: &Classifier) -> Vec<HostRecord> {
    let Joined {
        parents,
        mut subdomains,
    } = joined;

    let mut domains = Vec::with_capacity(parents.len());
    for (name, entry) in parents {
        let parent_preloaded = entry.pshtt.is_preloaded();
        let mut record = entry.record;

        let mut child_verdicts = Vec::new();
        for child_name in &record.subdomains {
            let Some(child) = subdomains.get_mut(child_name) else {
                continue;
            };
            if child.record.live {
                let verdict =
                    classifier.classify(&child.pshtt, child.cipher.as_ref(), parent_preloaded);
                child.record.https = Some(verdict);
                child_verdicts.push(verdict);
            }
        }

        if record.live {
            record.https = Some(classifier.classify(&entry.pshtt, entry.cipher.as_ref(), false));
        }
        record.eligible_zone = record.live || !child_verdicts.is_empty();

        let zone: Vec<&ComplianceVerdict> =
            record.https.iter().chain(child_verdicts.iter()).collect();
        record.totals = Some(DomainTotals {
            https: HttpsTotals::from_verdicts(zone.iter().copied()),
            crypto: CryptoTotals::from_verdicts(zone.iter().copied()),
        });

        debug!(
            "[{}] eligible: {}, zone eligible: {}, eligible subdomains: {}",
            name,
            record.live,
            record.eligible_zone,
            child_verdicts.len()
        );
        domains.push(record);
    }

    domains.extend(subdomains.into_values().map(|entry| entry.record));
    domains
}

/// Recomputes every organization's rollups from the host list.
pub fn organization_totals(
    organizations: &mut BTreeMap<String, OrganizationRecord>,
    hosts: &[HostRecord],
) {
    let mut by_org: BTreeMap<&str, Vec<&HostRecord>> = BTreeMap::new();
    for host in hosts {
        by_org
            .entry(host.organization_slug.as_str())
            .or_default()
            .push(host);
    }

    for (slug, organization) in organizations.iter_mut() {
        let members = by_org.get(slug.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        organization.totals = ReportTotals::summarize(members.iter().copied());
    }
}

/// Builds the government-wide report.
pub fn full_report(hosts: &[HostRecord], report_date: &str) -> Report {
    Report {
        report_date: report_date.to_string(),
        totals: ReportTotals::summarize(hosts),
    }
}
