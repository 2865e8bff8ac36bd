//! Rebuild/publish step.
//!
//! Replaces the store's contents with a freshly computed dataset: all three
//! collections are cleared, then organizations, hosts and the report are
//! written in that order so host documents never reference a missing
//! organization.
//!
//! The clear and the writes are separate operations. A run interrupted in
//! between leaves the store partially written until the next run, and two
//! runs must never publish to the same store at once.

use log::info;

use crate::error_handling::DatabaseError;
use crate::models::{Dataset, HostRecord, OrganizationRecord, Report};
use crate::storage::{Collection, DocumentStore};

/// Counts of documents written by [`publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishSummary {
    pub organizations: usize,
    pub hosts: usize,
    pub reports: usize,
}

/// Clears the destination and writes `dataset` into it.
///
/// # Errors
///
/// Returns the first `DatabaseError` raised by the store; documents written
/// before the failure stay in place.
pub async fn publish<S: DocumentStore>(
    store: &S,
    dataset: &Dataset,
) -> Result<PublishSummary, DatabaseError> {
    info!("Clearing the database.");
    // Hosts reference organizations, so they go first.
    for collection in [Collection::Domains, Collection::Reports, Collection::Organizations] {
        store.clear(collection).await?;
    }

    info!("Creating {} organizations.", dataset.organizations.len());
    let organizations = store
        .insert_many::<OrganizationRecord>(&dataset.organizations)
        .await?;

    info!("Creating {} domains and subdomains.", dataset.hosts.len());
    let hosts = store.insert_many::<HostRecord>(&dataset.hosts).await?;

    info!("Creating government-wide totals.");
    let reports = store
        .insert_many::<Report>(std::slice::from_ref(&dataset.report))
        .await?;

    Ok(PublishSummary {
        organizations,
        hosts,
        reports,
    })
}
