//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and the library configuration handed to the pipeline.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_GATHERERS, DEFAULT_PARENT_SOURCE, HSTS_MIN_MAX_AGE, PARENT_CIPHER_CSV,
    PARENT_DOMAINS_CSV, PARENT_PSHTT_CSV, SUBDOMAIN_CIPHER_CSV, SUBDOMAIN_GATHERED_CSV,
    SUBDOMAIN_PSHTT_CSV,
};
use crate::export::{ExportFormat, ReportKind};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Locations of the six CSV sources consumed by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    /// Domains list (mandatory)
    pub domains: PathBuf,
    /// Gathered subdomains (optional)
    pub gathered_subdomains: PathBuf,
    /// pshtt scan of parent domains (mandatory)
    pub parent_pshtt: PathBuf,
    /// Cipher scan of parent domains (optional)
    pub parent_cipher: PathBuf,
    /// pshtt scan of subdomains (optional)
    pub subdomain_pshtt: PathBuf,
    /// Cipher scan of subdomains (optional)
    pub subdomain_cipher: PathBuf,
}

impl InputPaths {
    /// Derives every input path from the conventional scan output layout
    /// rooted at `dir`.
    pub fn from_data_dir(dir: &Path) -> Self {
        Self {
            domains: dir.join(PARENT_DOMAINS_CSV),
            gathered_subdomains: dir.join(SUBDOMAIN_GATHERED_CSV),
            parent_pshtt: dir.join(PARENT_PSHTT_CSV),
            parent_cipher: dir.join(PARENT_CIPHER_CSV),
            subdomain_pshtt: dir.join(SUBDOMAIN_PSHTT_CSV),
            subdomain_cipher: dir.join(SUBDOMAIN_CIPHER_CSV),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::from_data_dir(Path::new("./data/output"))
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the explicit configuration value handed to the pipeline entry
/// point. Nothing in the engine reads process-wide state.
///
/// # Examples
///
/// ```no_run
/// use https_tracker::Config;
/// use std::path::Path;
///
/// let config = Config {
///     report_date: Some("2024-03-01".to_string()),
///     ..Config::from_data_dir(Path::new("./data/output"))
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV sources
    pub inputs: InputPaths,

    /// Discovery source names, in gathered-subdomains column order
    pub gatherers: Vec<String>,

    /// Source tag recorded on every parent domain
    pub parent_source: String,

    /// Minimum HSTS max-age in seconds
    pub hsts_min_max_age: i64,

    /// Report date (`YYYY-MM-DD`); today when unset
    pub report_date: Option<String>,

    /// Database path (SQLite file)
    pub db_path: PathBuf,
}

impl Config {
    /// Default configuration reading its inputs from `dir`.
    pub fn from_data_dir(dir: &Path) -> Self {
        Self {
            inputs: InputPaths::from_data_dir(dir),
            ..Default::default()
        }
    }

    /// The configured report date, or today's date when none was given.
    pub fn report_date(&self) -> String {
        self.report_date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            gatherers: DEFAULT_GATHERERS.iter().map(|s| s.to_string()).collect(),
            parent_source: DEFAULT_PARENT_SOURCE.to_string(),
            hsts_min_max_age: HSTS_MIN_MAX_AGE,
            report_date: None,
            db_path: PathBuf::from(DB_PATH),
        }
    }
}

/// Which host list an export covers.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportScopeArg {
    /// Every eligible host, parents and subdomains
    Hosts,
    /// Parent domains whose zone is eligible
    Parents,
    /// Organizations with at least one eligible host
    Organizations,
    /// The latest government-wide totals
    Report,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Rebuild the dataset from a scan output directory
/// https_tracker process ./data/output --date 2024-03-01
///
/// # Export the HTTPS host list as CSV
/// https_tracker export https --format csv --output hosts.csv
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "https_tracker",
    about = "Builds HTTPS/TLS compliance data from domain scan output."
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, env = "TRACKER_DB_PATH", default_value = DB_PATH, global = true)]
    pub db_path: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild the compliance dataset from scan output
    Process {
        /// Scan output directory
        #[arg(value_parser)]
        data_dir: PathBuf,

        /// Report date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_report_date)]
        date: Option<String>,

        /// Discovery source names, in gathered-subdomains column order
        #[arg(long = "gatherer", env = "GATHERERS", value_delimiter = ',')]
        gatherers: Vec<String>,
    },

    /// Export published data for one report
    Export {
        /// Report to export: https|crypto|preloading
        #[arg(value_enum)]
        report: ReportKind,

        /// Output format: csv|json
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Host list to export
        #[arg(long, value_enum, default_value_t = ExportScopeArg::Hosts)]
        scope: ExportScopeArg,

        /// Restrict the export to one parent domain and its subdomains
        #[arg(long)]
        domain: Option<String>,
    },
}

impl Opt {
    /// Builds the pipeline configuration for a `process` invocation.
    ///
    /// Returns `None` for other subcommands.
    pub fn pipeline_config(&self) -> Option<Config> {
        match &self.command {
            Command::Process {
                data_dir,
                date,
                gatherers,
            } => {
                let mut config = Config::from_data_dir(data_dir);
                config.report_date = date.clone();
                if !gatherers.is_empty() {
                    config.gatherers = gatherers.clone();
                }
                config.db_path = self.db_path.clone();
                Some(config)
            }
            Command::Export { .. } => None,
        }
    }
}

fn parse_report_date(value: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| value.to_string())
        .map_err(|_| format!("{value} is not a valid date (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.hsts_min_max_age, 31_536_000);
        assert_eq!(config.gatherers, vec!["other", "canada-gov"]);
        assert_eq!(config.parent_source, "canada-gov");
        assert!(config.report_date.is_none());
        assert_eq!(config.db_path, PathBuf::from("./https_tracker.db"));
    }

    #[test]
    fn test_input_paths_from_data_dir() {
        let paths = InputPaths::from_data_dir(Path::new("/scans"));
        assert_eq!(
            paths.domains,
            PathBuf::from("/scans/parents/cache/domains.csv")
        );
        assert_eq!(
            paths.subdomain_cipher,
            PathBuf::from("/scans/subdomains/scan/results/sslyze.csv")
        );
        assert_eq!(
            paths.gathered_subdomains,
            PathBuf::from("/scans/subdomains/gather/results/gathered.csv")
        );
    }

    #[test]
    fn test_report_date_explicit() {
        let config = Config {
            report_date: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        assert_eq!(config.report_date(), "2024-03-01");
    }

    #[test]
    fn test_report_date_defaults_to_today() {
        let date = Config::default().report_date();
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_parse_report_date() {
        assert_eq!(parse_report_date("2024-02-29").unwrap(), "2024-02-29");
        assert!(parse_report_date("2023-02-29").is_err());
        assert!(parse_report_date("yesterday").is_err());
    }

    #[test]
    fn test_opt_process_builds_config() {
        let opt = Opt::parse_from([
            "https_tracker",
            "--db-path",
            "/tmp/t.db",
            "process",
            "/scans",
            "--date",
            "2024-03-01",
            "--gatherer",
            "censys,other",
        ]);
        let config = opt.pipeline_config().expect("process builds a config");
        assert_eq!(config.db_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.report_date.as_deref(), Some("2024-03-01"));
        assert_eq!(config.gatherers, vec!["censys", "other"]);
        assert_eq!(
            config.inputs.parent_pshtt,
            PathBuf::from("/scans/parents/results/pshtt.csv")
        );
    }

    #[test]
    fn test_opt_export_has_no_pipeline_config() {
        let opt = Opt::parse_from(["https_tracker", "export", "crypto", "--format", "json"]);
        assert!(opt.pipeline_config().is_none());
        match opt.command {
            Command::Export { report, format, .. } => {
                assert_eq!(report, ReportKind::Crypto);
                assert_eq!(format, ExportFormat::Json);
            }
            Command::Process { .. } => panic!("expected export"),
        }
    }
}
