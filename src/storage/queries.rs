//! Read queries over published documents, used by the exports.

use log::debug;

use crate::error_handling::DatabaseError;
use crate::export::ReportKind;
use crate::models::{HostRecord, OrganizationRecord, Report};

use super::store::DocumentStore;

/// The most recent government-wide report, if any run has been published.
pub async fn latest_report<S: DocumentStore>(store: &S) -> Result<Option<Report>, DatabaseError> {
    let reports: Vec<Report> = store.find_all().await?;
    Ok(reports
        .into_iter()
        .max_by(|a, b| a.report_date.cmp(&b.report_date)))
}

fn sort_hosts(hosts: &mut [HostRecord]) {
    hosts.sort_by(|a, b| {
        a.base_domain
            .cmp(&b.base_domain)
            .then(b.is_parent.cmp(&a.is_parent))
            .then(a.hostname.cmp(&b.hostname))
    });
}

/// Hosts eligible for a report, grouped by base domain with each parent
/// ahead of its subdomains.
pub async fn eligible_hosts<S: DocumentStore>(
    store: &S,
    report: ReportKind,
) -> Result<Vec<HostRecord>, DatabaseError> {
    let mut hosts: Vec<HostRecord> = store
        .find_all::<HostRecord>()
        .await?
        .into_iter()
        .filter(|host| report.includes_host(host))
        .collect();
    sort_hosts(&mut hosts);
    debug!("{} hosts eligible for {}", hosts.len(), report);
    Ok(hosts)
}

/// Parent domains for a report's zone view.
///
/// For HTTPS and crypto a parent qualifies when it or any of its subdomains
/// is live. Every parent qualifies for preloading.
pub async fn eligible_parents<S: DocumentStore>(
    store: &S,
    report: ReportKind,
) -> Result<Vec<HostRecord>, DatabaseError> {
    let mut parents: Vec<HostRecord> = store
        .find_all::<HostRecord>()
        .await?
        .into_iter()
        .filter(|host| host.is_parent)
        .filter(|host| report == ReportKind::Preloading || host.eligible_zone)
        .collect();
    sort_hosts(&mut parents);
    Ok(parents)
}

/// A parent domain and its subdomains that are eligible for a report,
/// parent first.
pub async fn hosts_for_domain<S: DocumentStore>(
    store: &S,
    base_domain: &str,
    report: ReportKind,
) -> Result<Vec<HostRecord>, DatabaseError> {
    let base_domain = base_domain.trim().to_lowercase();
    let mut hosts: Vec<HostRecord> = store
        .find_all::<HostRecord>()
        .await?
        .into_iter()
        .filter(|host| host.base_domain == base_domain && report.includes_host(host))
        .collect();
    sort_hosts(&mut hosts);
    Ok(hosts)
}

/// Organizations with at least one host eligible for a report, by slug.
pub async fn eligible_organizations<S: DocumentStore>(
    store: &S,
    report: ReportKind,
) -> Result<Vec<OrganizationRecord>, DatabaseError> {
    let mut organizations: Vec<OrganizationRecord> = store
        .find_all::<OrganizationRecord>()
        .await?
        .into_iter()
        .filter(|org| report.eligible_in(&org.totals) > 0)
        .collect();
    organizations.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(organizations)
}
