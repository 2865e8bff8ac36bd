//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `https_tracker` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use https_tracker::config::{Command, Opt};
use https_tracker::export::{export, ExportOptions, ExportScope};
use https_tracker::initialization::init_logger_with;
use https_tracker::run_pipeline;

async fn dispatch(opt: Opt) -> Result<()> {
    if let Some(config) = opt.pipeline_config() {
        let report = run_pipeline(config).await?;
        println!(
            "Published {} organization{}, {} domain{} and {} subdomain{} for {} ({} removed, {} warning{})",
            report.organizations,
            if report.organizations == 1 { "" } else { "s" },
            report.domains,
            if report.domains == 1 { "" } else { "s" },
            report.subdomains,
            if report.subdomains == 1 { "" } else { "s" },
            report.report_date,
            report.removed_hosts,
            report.warnings,
            if report.warnings == 1 { "" } else { "s" },
        );
        println!("Results saved in {}", report.db_path.display());
        return Ok(());
    }

    if let Command::Export {
        report,
        format,
        output,
        scope,
        domain,
    } = opt.command
    {
        let opts = ExportOptions {
            db_path: opt.db_path,
            output,
            format,
            report,
            scope: ExportScope::from_args(&scope, domain.as_deref()),
        };
        export(&opts).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = dispatch(opt).await {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
