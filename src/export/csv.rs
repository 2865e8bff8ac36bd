//! CSV export functionality.
//!
//! Host exports use a two-tier header: the common host fields, then the
//! fields of the requested report. Coded verdict fields are translated to
//! display labels, booleans become `Yes`/`No`, and values that do not apply
//! to a host are left empty.

use std::io::Write;

use anyhow::Result;
use csv::Writer;

use crate::classify::ComplianceVerdict;
use crate::models::{HostRecord, OrganizationRecord, Report};

use super::types::ReportKind;

/// Header of the fields shared by every host export.
pub const COMMON_HEADER: [&str; 6] = [
    "Domain",
    "Base Domain",
    "Canonical URL",
    "Organization (EN)",
    "Organization (FR)",
    "Sources",
];

const USES_HTTPS_LABELS: &[(i8, &str)] = &[
    (-1, "No"),
    (1, "Yes (with certificate chain issues)"),
    (2, "Yes"),
];

const ENFORCEMENT_LABELS: &[(i8, &str)] = &[
    (0, ""),
    (1, "Present, not default"),
    (2, "Yes"),
    (3, "Yes (strict)"),
];

const HSTS_LABELS: &[(i8, &str)] = &[
    (-1, ""),
    (0, "No"),
    (1, "No, max-age too short"),
    (2, "Yes"),
    (3, "Yes (via preloading)"),
];

const PRELOAD_LABELS: &[(i8, &str)] = &[(0, "No"), (1, "Ready for submission"), (2, "Yes")];

const CRYPTO_LABELS: &[(i8, &str)] = &[(-1, ""), (0, "Fails"), (1, "Passes")];

fn mapped(table: &[(i8, &'static str)], code: i8) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or("")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// A report-specific column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReportField {
    UsesHttps,
    Enforcement,
    Hsts,
    HstsMaxAge,
    PreloadStatus,
    MeetsPolicyA,
    MeetsPolicyB,
    CryptoStatus,
    Sslv2,
    Sslv3,
    Rc4,
    TripleDes,
}

impl ReportField {
    fn label(self) -> &'static str {
        match self {
            ReportField::UsesHttps => "Uses HTTPS",
            ReportField::Enforcement => "Enforces HTTPS",
            ReportField::Hsts => "Strict Transport Security (HSTS)",
            ReportField::HstsMaxAge => "HSTS Max Age",
            ReportField::PreloadStatus => "Preloaded",
            ReportField::MeetsPolicyA => "Compliant (HTTPS and HSTS)",
            ReportField::MeetsPolicyB => "Compliant (HTTPS, HSTS and ciphers)",
            ReportField::CryptoStatus => "Ciphers and Protocols",
            ReportField::Sslv2 => "SSLv2",
            ReportField::Sslv3 => "SSLv3",
            ReportField::Rc4 => "RC4",
            ReportField::TripleDes => "3DES",
        }
    }

    /// Hosts without a verdict still carry their own preload status.
    fn value(self, host: &HostRecord) -> String {
        match host.https.as_ref() {
            Some(verdict) => self.verdict_value(verdict),
            None if self == ReportField::PreloadStatus => {
                mapped(PRELOAD_LABELS, host.preload_status.code()).to_string()
            }
            None => String::new(),
        }
    }

    fn verdict_value(self, verdict: &ComplianceVerdict) -> String {
        let weak = verdict.weak_ciphers;
        let cipher_flag = |flag: fn(&crate::classify::WeakCiphers) -> bool| {
            weak.as_ref()
                .map(|w| yes_no(flag(w)).to_string())
                .unwrap_or_default()
        };
        match self {
            ReportField::UsesHttps => mapped(USES_HTTPS_LABELS, verdict.uses_https.code()).into(),
            ReportField::Enforcement => {
                mapped(ENFORCEMENT_LABELS, verdict.enforcement.code()).into()
            }
            ReportField::Hsts => mapped(HSTS_LABELS, verdict.hsts.code()).into(),
            ReportField::HstsMaxAge => verdict
                .hsts_max_age
                .map(|age| age.to_string())
                .unwrap_or_default(),
            ReportField::PreloadStatus => {
                mapped(PRELOAD_LABELS, verdict.preload_status.code()).into()
            }
            ReportField::MeetsPolicyA => yes_no(verdict.meets_policy_a()).into(),
            ReportField::MeetsPolicyB => yes_no(verdict.meets_policy_b()).into(),
            ReportField::CryptoStatus => {
                mapped(CRYPTO_LABELS, verdict.crypto_status.code()).into()
            }
            ReportField::Sslv2 => cipher_flag(|w| w.sslv2),
            ReportField::Sslv3 => cipher_flag(|w| w.sslv3),
            ReportField::Rc4 => cipher_flag(|w| w.rc4),
            ReportField::TripleDes => cipher_flag(|w| w.triple_des),
        }
    }
}

fn report_fields(report: ReportKind) -> &'static [ReportField] {
    match report {
        ReportKind::Https => &[
            ReportField::UsesHttps,
            ReportField::Enforcement,
            ReportField::Hsts,
            ReportField::HstsMaxAge,
            ReportField::PreloadStatus,
            ReportField::MeetsPolicyA,
            ReportField::MeetsPolicyB,
        ],
        ReportKind::Crypto => &[
            ReportField::CryptoStatus,
            ReportField::Sslv2,
            ReportField::Sslv3,
            ReportField::Rc4,
            ReportField::TripleDes,
            ReportField::MeetsPolicyB,
        ],
        ReportKind::Preloading => &[ReportField::PreloadStatus],
    }
}

/// Full host header for a report.
pub fn host_header(report: ReportKind) -> Vec<&'static str> {
    COMMON_HEADER
        .iter()
        .copied()
        .chain(report_fields(report).iter().map(|f| f.label()))
        .collect()
}

fn host_row(host: &HostRecord, report: ReportKind) -> Vec<String> {
    let sources: Vec<&str> = host.sources.iter().map(String::as_str).collect();
    let mut row = vec![
        host.hostname.clone(),
        host.base_domain.clone(),
        host.canonical_url.clone(),
        host.organization_name_en.clone(),
        host.organization_name_fr.clone(),
        sources.join(", "),
    ];
    row.extend(report_fields(report).iter().map(|f| f.value(host)));
    row
}

/// Writes hosts as CSV. Returns the number of data rows written.
pub fn write_hosts_csv<W: Write>(
    writer: W,
    hosts: &[HostRecord],
    report: ReportKind,
) -> Result<usize> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(host_header(report))?;
    for host in hosts {
        writer.write_record(host_row(host, report))?;
    }
    writer.flush()?;
    Ok(hosts.len())
}

fn totals_header(report: ReportKind, leading: &[&'static str]) -> Vec<&'static str> {
    let totals = crate::aggregate::ReportTotals::default();
    let mut header = leading.to_vec();
    header.push("eligible");
    header.extend(report.section(&totals).criteria().into_iter().map(|(name, _)| name));
    header
}

fn totals_row(report: ReportKind, totals: &crate::aggregate::ReportTotals) -> Vec<String> {
    let section = report.section(totals);
    std::iter::once(section.eligible())
        .chain(section.criteria().into_iter().map(|(_, count)| count))
        .map(|n| n.to_string())
        .collect()
}

/// Writes one report's section of each organization's rollups.
pub fn write_organizations_csv<W: Write>(
    writer: W,
    organizations: &[OrganizationRecord],
    report: ReportKind,
) -> Result<usize> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(totals_header(
        report,
        &["Slug", "Organization (EN)", "Organization (FR)", "Total Domains"],
    ))?;
    for org in organizations {
        let mut row = vec![
            org.slug.clone(),
            org.name_en.clone(),
            org.name_fr.clone(),
            org.total_domains.to_string(),
        ];
        row.extend(totals_row(report, &org.totals));
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(organizations.len())
}

/// Writes one report's section of the government-wide totals.
pub fn write_report_csv<W: Write>(
    writer: W,
    government: Option<&Report>,
    report: ReportKind,
) -> Result<usize> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(totals_header(report, &["Report Date"]))?;
    let written = match government {
        Some(government) => {
            let mut row = vec![government.report_date.clone()];
            row.extend(totals_row(report, &government.totals));
            writer.write_record(row)?;
            1
        }
        None => 0,
    };
    writer.flush()?;
    Ok(written)
}
