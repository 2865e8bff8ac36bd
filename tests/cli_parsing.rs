//! Tests for command-line parsing.

use clap::Parser;
use std::path::PathBuf;

use https_tracker::config::{Command, ExportScopeArg, Opt};
use https_tracker::export::{ExportFormat, ReportKind};

#[test]
fn test_process_defaults() {
    let opt = Opt::try_parse_from(["https_tracker", "process", "./scans"]).unwrap();
    let config = opt.pipeline_config().unwrap();
    assert_eq!(config.inputs.domains, PathBuf::from("./scans/parents/cache/domains.csv"));
    assert_eq!(config.gatherers, vec!["other", "canada-gov"]);
    assert_eq!(config.report_date, None);
    assert_eq!(config.hsts_min_max_age, 31_536_000);
}

#[test]
fn test_process_options() {
    let opt = Opt::try_parse_from([
        "https_tracker",
        "--db-path",
        "/tmp/t.db",
        "process",
        "./scans",
        "--date",
        "2024-02-29",
        "--gatherer",
        "censys,canada-gov",
    ])
    .unwrap();
    let config = opt.pipeline_config().unwrap();
    assert_eq!(config.report_date.as_deref(), Some("2024-02-29"));
    assert_eq!(config.gatherers, vec!["censys", "canada-gov"]);
    assert_eq!(config.db_path, PathBuf::from("/tmp/t.db"));
    assert_eq!(config.report_date(), "2024-02-29");
}

#[test]
fn test_invalid_date_rejected() {
    assert!(Opt::try_parse_from(["https_tracker", "process", ".", "--date", "2024-02-30"]).is_err());
    assert!(Opt::try_parse_from(["https_tracker", "process", ".", "--date", "May 1"]).is_err());
}

#[test]
fn test_export_arguments() {
    let opt = Opt::try_parse_from([
        "https_tracker",
        "export",
        "crypto",
        "--format",
        "json",
        "--scope",
        "organizations",
    ])
    .unwrap();
    assert!(opt.pipeline_config().is_none());
    match opt.command {
        Command::Export {
            report,
            format,
            output,
            scope,
            domain,
        } => {
            assert_eq!(report, ReportKind::Crypto);
            assert_eq!(format, ExportFormat::Json);
            assert_eq!(scope, ExportScopeArg::Organizations);
            assert!(output.is_none() && domain.is_none());
        }
        Command::Process { .. } => panic!("expected export"),
    }
}

#[test]
fn test_unknown_report_rejected() {
    assert!(Opt::try_parse_from(["https_tracker", "export", "dnssec"]).is_err());
}
