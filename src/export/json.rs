//! JSON export functionality.
//!
//! Hosts and organizations are written as `{"data": [...]}`. The report
//! scope writes the requested section of the latest government-wide totals
//! together with its date.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use crate::models::Report;

use super::types::ReportKind;

#[derive(Serialize)]
struct DataEnvelope<'a, T: Serialize> {
    data: &'a [T],
}

/// Writes documents under a `data` key. Returns the number written.
pub fn write_documents_json<W: Write, T: Serialize>(mut writer: W, documents: &[T]) -> Result<usize> {
    serde_json::to_writer_pretty(&mut writer, &DataEnvelope { data: documents })?;
    writeln!(writer)?;
    Ok(documents.len())
}

/// Writes one report's section of the government-wide totals.
pub fn write_report_json<W: Write>(
    mut writer: W,
    government: Option<&Report>,
    report: ReportKind,
) -> Result<usize> {
    let value = match government {
        Some(government) => {
            let section = match report {
                ReportKind::Https => serde_json::to_value(government.totals.https)?,
                ReportKind::Crypto => serde_json::to_value(government.totals.crypto)?,
                ReportKind::Preloading => serde_json::to_value(government.totals.preloading)?,
            };
            let mut object = serde_json::Map::new();
            object.insert("report_date".to_string(), json!(government.report_date));
            object.insert(report.to_string(), section);
            serde_json::Value::Object(object)
        }
        None => json!({}),
    };
    serde_json::to_writer_pretty(&mut writer, &value)?;
    writeln!(writer)?;
    Ok(usize::from(government.is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReportTotals;
    use crate::models::OrganizationRecord;

    #[test]
    fn test_documents_are_wrapped() {
        let orgs = vec![OrganizationRecord::new("hc", "Health Canada", "Santé Canada")];
        let mut out = Vec::new();
        assert_eq!(write_documents_json(&mut out, &orgs).unwrap(), 1);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["data"][0]["slug"], "hc");
        assert_eq!(value["data"][0]["https"]["eligible"], 0);
    }

    #[test]
    fn test_report_section() {
        let mut totals = ReportTotals::default();
        totals.crypto.eligible = 3;
        totals.crypto.triple_des = 1;
        let report = Report {
            report_date: "2024-05-01".to_string(),
            totals,
        };
        let mut out = Vec::new();
        write_report_json(&mut out, Some(&report), ReportKind::Crypto).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["report_date"], "2024-05-01");
        assert_eq!(value["crypto"]["eligible"], 3);
        assert_eq!(value["crypto"]["3des"], 1);
        assert!(value.get("https").is_none());
    }
}
