//! https_tracker library: HTTPS/TLS compliance data for government domains
//!
//! Turns the CSV output of pshtt and sslyze scans over a list of parent
//! domains and their discovered subdomains into a normalized dataset:
//! per-host compliance verdicts, per-domain and per-organization rollups,
//! and government-wide totals, published to a SQLite document store.
//!
//! # Example
//!
//! ```no_run
//! use https_tracker::{run_pipeline, Config};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     report_date: Some("2024-05-01".to_string()),
//!     ..Config::from_data_dir(Path::new("./data/output"))
//! };
//!
//! let report = run_pipeline(config).await?;
//! println!("Published {} domains and {} subdomains",
//!          report.domains, report.subdomains);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Publishing and exports need a Tokio runtime. Building the dataset with
//! [`build_dataset`] is synchronous.

pub mod aggregate;
pub mod app;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod join;
pub mod load;
pub mod models;
pub mod publish;
pub mod scan;
pub mod storage;

// Re-export public API
pub use classify::{classify, Classifier, ComplianceVerdict};
pub use config::{Config, InputPaths, LogFormat, LogLevel};
pub use error_handling::{IngestStats, MissingInputError, WarningType};
pub use models::{Dataset, HostRecord, OrganizationRecord, Report};
pub use run::{build_dataset, run_pipeline, PipelineReport};

// Internal run module (contains the pipeline entry points)
mod run {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use log::info;

    use crate::aggregate::{full_report, organization_totals, process_domains};
    use crate::app::{print_ingest_statistics, print_report};
    use crate::catalog::build_catalog;
    use crate::classify::Classifier;
    use crate::config::Config;
    use crate::error_handling::{IngestStats, MissingInputError};
    use crate::join::join_scans;
    use crate::models::Dataset;
    use crate::publish::publish;
    use crate::storage::open_store;

    /// Results of one pipeline run.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PipelineReport {
        /// Organizations published
        pub organizations: usize,
        /// Parent domains published
        pub domains: usize,
        /// Live subdomains published
        pub subdomains: usize,
        /// Hosts dropped for lack of usable pshtt data
        pub removed_hosts: usize,
        /// Every per-row anomaly absorbed during ingestion
        pub warnings: usize,
        /// Report date of the published totals
        pub report_date: String,
        /// SQLite database the dataset was published to
        pub db_path: PathBuf,
    }

    /// Loads, joins, classifies and aggregates the scan output named in
    /// `config`, without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `MissingInputError` if the domains list or the parent pshtt
    /// scan cannot be opened. Every other anomaly is counted in the
    /// returned `IngestStats`.
    pub fn build_dataset(config: &Config) -> Result<(Dataset, IngestStats), MissingInputError> {
        let mut stats = IngestStats::new();

        info!("Loading domains list and gathered subdomains.");
        let catalog = build_catalog(
            &config.inputs,
            &config.gatherers,
            &config.parent_source,
            &mut stats,
        )?;

        info!("Joining scan data.");
        let joined = join_scans(&catalog, &config.inputs, &mut stats)?;

        info!("Classifying hosts.");
        let classifier = Classifier {
            hsts_min_max_age: config.hsts_min_max_age,
        };
        let hosts = process_domains(joined, &classifier);

        info!("Computing organization and government-wide totals.");
        let mut organizations = catalog.organizations;
        organization_totals(&mut organizations, &hosts);
        let report = full_report(&hosts, &config.report_date());

        let dataset = Dataset {
            organizations: organizations.into_values().collect(),
            hosts,
            report,
        };
        Ok((dataset, stats))
    }

    /// Runs the whole pipeline and publishes the result.
    ///
    /// The store at `config.db_path` is created and migrated if needed,
    /// then fully replaced by this run's dataset.
    ///
    /// # Errors
    ///
    /// Fails on a missing mandatory input or any database error. Nothing is
    /// written to the store when an input is missing.
    pub async fn run_pipeline(config: Config) -> Result<PipelineReport> {
        let (dataset, stats) = build_dataset(&config).context("Failed to load scan data")?;

        let store = open_store(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
        publish(&store, &dataset)
            .await
            .context("Failed to publish the dataset")?;

        print_report(&dataset.report);
        print_ingest_statistics(&stats);

        let domains = dataset.hosts.iter().filter(|h| h.is_parent).count();
        Ok(PipelineReport {
            organizations: dataset.organizations.len(),
            domains,
            subdomains: dataset.hosts.len() - domains,
            removed_hosts: stats.removed_hosts(),
            warnings: stats.total(),
            report_date: dataset.report.report_date,
            db_path: config.db_path,
        })
    }
}
