//! Export functionality for published compliance data.
//!
//! This module reads the published documents back from the SQLite store
//! and writes host lists, organization rollups or the government-wide
//! totals as CSV or JSON.

mod csv;
mod json;
mod output;
mod types;

pub use self::csv::{
    host_header, write_hosts_csv, write_organizations_csv, write_report_csv, COMMON_HEADER,
};
pub use self::json::{write_documents_json, write_report_json};
pub use types::{ExportFormat, ExportOptions, ExportScope, ReportKind};

use std::io::Write;

use anyhow::{bail, Context, Result};
use log::info;

use crate::error_handling::DatabaseError;
use crate::models::{HostRecord, OrganizationRecord, Report};
use crate::storage::{self, DocumentStore};

/// Documents selected for one export.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Hosts(Vec<HostRecord>),
    Organizations(Vec<OrganizationRecord>),
    Report(Option<Report>),
}

/// Reads the documents an export covers.
pub async fn select<S: DocumentStore>(
    store: &S,
    report: ReportKind,
    scope: &ExportScope,
) -> Result<Selection, DatabaseError> {
    Ok(match scope {
        ExportScope::Hosts => Selection::Hosts(storage::eligible_hosts(store, report).await?),
        ExportScope::Parents => Selection::Hosts(storage::eligible_parents(store, report).await?),
        ExportScope::Domain(domain) => {
            Selection::Hosts(storage::hosts_for_domain(store, domain, report).await?)
        }
        ExportScope::Organizations => {
            Selection::Organizations(storage::eligible_organizations(store, report).await?)
        }
        ExportScope::Report => Selection::Report(storage::latest_report(store).await?),
    })
}

/// Writes a selection in the requested format. Returns the number of
/// records written.
pub fn write_selection<W: Write>(
    writer: W,
    selection: &Selection,
    report: ReportKind,
    format: ExportFormat,
) -> Result<usize> {
    match (format, selection) {
        (ExportFormat::Csv, Selection::Hosts(hosts)) => write_hosts_csv(writer, hosts, report),
        (ExportFormat::Csv, Selection::Organizations(orgs)) => {
            write_organizations_csv(writer, orgs, report)
        }
        (ExportFormat::Csv, Selection::Report(government)) => {
            write_report_csv(writer, government.as_ref(), report)
        }
        (ExportFormat::Json, Selection::Hosts(hosts)) => write_documents_json(writer, hosts),
        (ExportFormat::Json, Selection::Organizations(orgs)) => write_documents_json(writer, orgs),
        (ExportFormat::Json, Selection::Report(government)) => {
            write_report_json(writer, government.as_ref(), report)
        }
    }
}

/// Exports published data from the database at `opts.db_path`.
///
/// # Errors
///
/// Fails if the database does not exist yet, cannot be read, or the output
/// cannot be written.
pub async fn export(opts: &ExportOptions) -> Result<usize> {
    if !opts.db_path.exists() {
        bail!(
            "No database at {}; run `process` first",
            opts.db_path.display()
        );
    }
    let store = storage::open_store(&opts.db_path)
        .await
        .context("Failed to open the document store")?;

    let selection = select(&store, opts.report, &opts.scope)
        .await
        .context("Failed to read published documents")?;

    let mut writer = output::open_output(opts.output.as_deref())?;
    let count = write_selection(&mut writer, &selection, opts.report, opts.format)?;
    writer.flush().context("Failed to flush export output")?;

    info!(
        "Exported {} records ({} report, {:?})",
        count, opts.report, opts.scope
    );
    Ok(count)
}
