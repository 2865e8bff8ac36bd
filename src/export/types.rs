//! Export types and options.

use std::path::PathBuf;

use clap::ValueEnum;
use strum_macros::{Display, EnumIter};

use crate::aggregate::{ReportTotals, Totals};
use crate::config::ExportScopeArg;
use crate::models::HostRecord;

/// The three published reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ReportKind {
    /// HTTPS and HSTS posture of live hosts
    Https,
    /// Legacy protocols and weak ciphers of hosts with cipher scan data
    Crypto,
    /// Preload-list status of parent domains
    Preloading,
}

impl ReportKind {
    /// Whether a host belongs in this report's host list.
    pub fn includes_host(self, host: &HostRecord) -> bool {
        match self {
            ReportKind::Https => host.is_eligible(),
            ReportKind::Crypto => host.has_crypto_data(),
            ReportKind::Preloading => host.is_parent,
        }
    }

    /// This report's section of a set of rollups.
    pub fn section(self, totals: &ReportTotals) -> &dyn Totals {
        match self {
            ReportKind::Https => &totals.https,
            ReportKind::Crypto => &totals.crypto,
            ReportKind::Preloading => &totals.preloading,
        }
    }

    /// Size of this report's population within a set of rollups.
    pub fn eligible_in(self, totals: &ReportTotals) -> usize {
        self.section(totals).eligible()
    }
}

/// Export format options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV with a fixed header and display labels
    Csv,
    /// JSON documents under a `data` key
    Json,
}

/// What an export covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportScope {
    /// Every host eligible for the report
    Hosts,
    /// Zone-eligible parent domains
    Parents,
    /// One parent domain and its eligible subdomains
    Domain(String),
    /// Organizations with eligible hosts
    Organizations,
    /// Latest government-wide totals
    Report,
}

impl ExportScope {
    /// Resolves the CLI scope. A domain filter takes precedence.
    pub fn from_args(scope: &ExportScopeArg, domain: Option<&str>) -> Self {
        if let Some(domain) = domain {
            return ExportScope::Domain(domain.to_string());
        }
        match scope {
            ExportScopeArg::Hosts => ExportScope::Hosts,
            ExportScopeArg::Parents => ExportScope::Parents,
            ExportScopeArg::Organizations => ExportScope::Organizations,
            ExportScopeArg::Report => ExportScope::Report,
        }
    }
}

/// Options for exporting data.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Database path
    pub db_path: PathBuf,
    /// Output file path (or stdout if None)
    pub output: Option<PathBuf>,
    /// Export format
    pub format: ExportFormat,
    /// Report whose eligibility and fields apply
    pub report: ReportKind,
    /// Host or organization selection
    pub scope: ExportScope,
}
