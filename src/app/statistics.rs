//! Run summaries written to the log.

use log::info;

use crate::error_handling::IngestStats;
use crate::models::Report;

/// `100 * count / eligible`, rounded to the nearest whole percent.
///
/// An empty population reads as 0%.
pub fn percent(count: usize, eligible: usize) -> u64 {
    if eligible == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = (100.0 * count as f64 / eligible as f64).round() as u64;
    rounded
}

/// Lines of the government-wide summary, one block per report section.
pub fn report_lines(report: &Report) -> Vec<String> {
    let mut lines = vec![format!("Report for {}", report.report_date)];
    for (name, totals) in report.totals.sections() {
        lines.push(format!("[{}]", name));
        lines.push(format!("eligible: {}", totals.eligible()));
        for (criterion, count) in totals.criteria() {
            lines.push(format!(
                "{}: {}% ({})",
                criterion,
                percent(count, totals.eligible()),
                count
            ));
        }
    }
    lines
}

/// Logs the government-wide summary.
pub fn print_report(report: &Report) {
    for line in report_lines(report) {
        info!("{}", line);
    }
}

/// Logs every warning counter that fired during ingestion.
pub fn print_ingest_statistics(stats: &IngestStats) {
    let total = stats.total();
    if total == 0 {
        info!("No ingestion warnings");
        return;
    }
    info!("Warning Counts ({} total):", total);
    for (warning, count) in stats.non_zero() {
        info!("   {}: {}", warning, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::WarningType;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(4, 4), 100);
    }

    #[test]
    fn test_report_lines() {
        let mut report = Report {
            report_date: "2024-05-01".to_string(),
            totals: Default::default(),
        };
        report.totals.https.eligible = 3;
        report.totals.https.uses = 2;

        let lines = report_lines(&report);
        assert_eq!(lines[0], "Report for 2024-05-01");
        assert_eq!(lines[1], "[https]");
        assert_eq!(lines[2], "eligible: 3");
        assert!(lines.contains(&"uses: 67% (2)".to_string()));
        assert!(lines.contains(&"[crypto]".to_string()));
        assert!(lines.contains(&"[preloading]".to_string()));
    }

    #[test]
    fn test_print_ingest_statistics() {
        let mut stats = IngestStats::new();
        // Should not panic with or without warnings
        print_ingest_statistics(&stats);
        stats.increment(WarningType::UntrackedHost);
        print_ingest_statistics(&stats);
    }
}
