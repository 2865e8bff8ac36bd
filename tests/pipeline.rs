//! End-to-end tests: fixture scan output through the whole pipeline into a
//! SQLite store.

#[path = "helpers.rs"]
mod helpers;

use helpers::{write_csv, Fixture, PSHTT_HEADER};

use https_tracker::classify::{CryptoStatus, Hsts, PreloadStatus};
use https_tracker::config::{
    PARENT_DOMAINS_CSV, PARENT_PSHTT_CSV, SUBDOMAIN_GATHERED_CSV, SUBDOMAIN_PSHTT_CSV,
};
use https_tracker::storage::{open_store, DocumentStore};
use https_tracker::{
    build_dataset, run_pipeline, HostRecord, MissingInputError, OrganizationRecord, Report,
    WarningType,
};

fn host<'a>(hosts: &'a [HostRecord], name: &str) -> &'a HostRecord {
    hosts
        .iter()
        .find(|h| h.hostname == name)
        .unwrap_or_else(|| panic!("{} not in dataset", name))
}

#[test]
fn test_build_dataset_hosts() {
    let fixture = Fixture::new();
    let (dataset, stats) = build_dataset(&fixture.config()).unwrap();

    let names: Vec<&str> = dataset.hosts.iter().map(|h| h.hostname.as_str()).collect();
    assert_eq!(
        names,
        vec!["cra.gc.ca", "hc.gc.ca", "www.cra.gc.ca", "www.hc.gc.ca"]
    );

    let hc = host(&dataset.hosts, "hc.gc.ca");
    let verdict = hc.https.unwrap();
    assert!(verdict.meets_policy_b());
    assert_eq!(hc.subdomains, vec!["www.hc.gc.ca"]);
    assert_eq!(hc.organization_slug, "health-canada");

    let cra = host(&dataset.hosts, "cra.gc.ca");
    let verdict = cra.https.unwrap();
    assert_eq!(verdict.hsts, Hsts::Yes);
    assert_eq!(verdict.crypto_status, CryptoStatus::Fails);
    assert!(verdict.meets_policy_a() && !verdict.meets_policy_b());
    assert_eq!(cra.preload_status, PreloadStatus::Yes);
    // down.cra.gc.ca is not live and is never stored
    assert_eq!(cra.subdomains, vec!["www.cra.gc.ca"]);

    let www_hc = host(&dataset.hosts, "www.hc.gc.ca").https.unwrap();
    assert_eq!(www_hc.hsts, Hsts::TooShort);
    assert!(!www_hc.meets_policy_a());

    let www_cra = host(&dataset.hosts, "www.cra.gc.ca");
    assert_eq!(www_cra.base_domain, "cra.gc.ca");
    assert!(www_cra.sources.contains("canada-gov"));
    let verdict = www_cra.https.unwrap();
    assert_eq!(verdict.hsts, Hsts::YesViaPreload);
    assert_eq!(verdict.crypto_status, CryptoStatus::Unknown);
    assert!(verdict.meets_policy_b());

    assert_eq!(stats.get(WarningType::UntrackedHost), 1);
    assert_eq!(stats.get(WarningType::UnclassifiableHost), 1);
    assert_eq!(stats.removed_hosts(), 1);
}

#[test]
fn test_build_dataset_totals() {
    let fixture = Fixture::new();
    let (dataset, _) = build_dataset(&fixture.config()).unwrap();

    let totals = &dataset.report.totals;
    assert_eq!(dataset.report.report_date, "2024-05-01");
    assert_eq!(totals.https.eligible, 4);
    assert_eq!(totals.https.uses, 4);
    assert_eq!(totals.https.enforces, 4);
    assert_eq!(totals.https.hsts, 3);
    assert_eq!(totals.https.meets_policy_a, 3);
    assert_eq!(totals.https.meets_policy_b, 2);
    assert_eq!(totals.crypto.eligible, 3);
    assert_eq!(totals.crypto.passes, 2);
    assert_eq!(totals.crypto.sslv3, 1);
    assert_eq!(totals.preloading.eligible, 2);
    assert_eq!(totals.preloading.preloaded, 1);

    let slugs: Vec<&str> = dataset
        .organizations
        .iter()
        .map(|o| o.slug.as_str())
        .collect();
    assert_eq!(slugs, vec!["canada-revenue-agency", "health-canada"]);

    let hc = &dataset.organizations[1];
    // old.gc.ca still counts towards the catalog size
    assert_eq!(hc.total_domains, 2);
    assert_eq!(hc.totals.https.eligible, 2);
    assert_eq!(hc.totals.preloading.eligible, 1);

    let cra = &dataset.organizations[0];
    assert_eq!(cra.name_fr, "Agence du revenu du Canada");
    assert_eq!(cra.totals.https.meets_policy_a, 2);
    assert_eq!(cra.totals.https.meets_policy_b, 1);
    assert_eq!(cra.totals.preloading.preloaded, 1);

    // Organization rollups add up to the government-wide totals
    let eligible: usize = dataset
        .organizations
        .iter()
        .map(|o| o.totals.https.eligible)
        .sum();
    assert_eq!(eligible, totals.https.eligible);
}

#[test]
fn test_subdomain_of_removed_parent_is_dropped() {
    let fixture = Fixture::new();
    write_csv(
        fixture.root(),
        SUBDOMAIN_GATHERED_CSV,
        &[
            "www.hc.gc.ca,hc.gc.ca,True,False".to_string(),
            "www.old.gc.ca,old.gc.ca,True,False".to_string(),
        ],
    );
    write_csv(
        fixture.root(),
        SUBDOMAIN_PSHTT_CSV,
        &[
            PSHTT_HEADER.to_string(),
            helpers::pshtt_line("www.old.gc.ca", "old.gc.ca", "31536000", false),
        ],
    );

    let (dataset, stats) = build_dataset(&fixture.config()).unwrap();
    assert!(dataset.hosts.iter().all(|h| h.hostname != "www.old.gc.ca"));
    assert!(dataset.hosts.iter().all(|h| h.is_parent));
    // unlisted.gc.ca, www.old.gc.ca and the orphaned www.hc.gc.ca cipher row
    assert_eq!(stats.get(WarningType::UntrackedHost), 3);
}

#[test]
fn test_headerless_rows_are_counted() {
    let fixture = Fixture::new();
    write_csv(
        fixture.root(),
        PARENT_PSHTT_CSV,
        &[
            helpers::pshtt_line("cra.gc.ca", "cra.gc.ca", "63072000", true),
            PSHTT_HEADER.to_string(),
            helpers::pshtt_line("hc.gc.ca", "hc.gc.ca", "31536000", false),
        ],
    );

    let (dataset, stats) = build_dataset(&fixture.config()).unwrap();
    assert_eq!(stats.get(WarningType::HeaderlessRow), 1);
    // cra.gc.ca lost its only row and is removed with its subdomains
    assert!(dataset.hosts.iter().all(|h| h.base_domain == "hc.gc.ca"));
    assert_eq!(stats.get(WarningType::UnclassifiableHost), 2);
}

#[tokio::test]
async fn test_run_pipeline_publishes() {
    let fixture = Fixture::new();
    let report = run_pipeline(fixture.config()).await.unwrap();

    assert_eq!(report.organizations, 2);
    assert_eq!(report.domains, 2);
    assert_eq!(report.subdomains, 2);
    assert_eq!(report.removed_hosts, 1);
    assert_eq!(report.warnings, 2);
    assert_eq!(report.report_date, "2024-05-01");

    let store = open_store(&fixture.db_path()).await.unwrap();
    let hosts: Vec<HostRecord> = store.find_all().await.unwrap();
    assert_eq!(hosts.len(), 4);
    let orgs: Vec<OrganizationRecord> = store.find_all().await.unwrap();
    assert_eq!(orgs.len(), 2);
    let stored: Option<Report> = store.find_one("2024-05-01").await.unwrap();
    assert_eq!(stored.unwrap().totals.https.eligible, 4);
}

#[tokio::test]
async fn test_rerun_replaces_previous_dataset() {
    let fixture = Fixture::new();
    run_pipeline(fixture.config()).await.unwrap();

    // The next scan run no longer lists cra.gc.ca
    write_csv(
        fixture.root(),
        PARENT_DOMAINS_CSV,
        &["hc.gc.ca,,Health Canada,Santé Canada".to_string()],
    );
    let mut config = fixture.config();
    config.report_date = Some("2024-06-01".to_string());
    let report = run_pipeline(config).await.unwrap();
    assert_eq!(report.domains, 1);

    let store = open_store(&fixture.db_path()).await.unwrap();
    let hosts: Vec<HostRecord> = store.find_all().await.unwrap();
    let names: Vec<&str> = hosts.iter().map(|h| h.hostname.as_str()).collect();
    assert_eq!(names, vec!["hc.gc.ca", "www.hc.gc.ca"]);
    let reports: Vec<Report> = store.find_all().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_date, "2024-06-01");
}

#[tokio::test]
async fn test_base_domain_in_subdomain_scan_is_stored_once() {
    let fixture = Fixture::new();
    run_pipeline(fixture.config()).await.unwrap();

    // Gather output lists each base domain under itself
    write_csv(
        fixture.root(),
        SUBDOMAIN_GATHERED_CSV,
        &[
            "domain,base,other,canada-gov".to_string(),
            "hc.gc.ca,hc.gc.ca,True,False".to_string(),
            "www.hc.gc.ca,hc.gc.ca,True,False".to_string(),
            "www.cra.gc.ca,cra.gc.ca,False,True".to_string(),
            "down.cra.gc.ca,cra.gc.ca,True,True".to_string(),
        ],
    );
    write_csv(
        fixture.root(),
        SUBDOMAIN_PSHTT_CSV,
        &[
            PSHTT_HEADER.to_string(),
            helpers::pshtt_line("hc.gc.ca", "hc.gc.ca", "31536000", false),
            helpers::pshtt_line("www.hc.gc.ca", "hc.gc.ca", "100", false),
            helpers::pshtt_line("www.cra.gc.ca", "cra.gc.ca", "", false),
            helpers::dead_pshtt_line("down.cra.gc.ca", "cra.gc.ca"),
        ],
    );

    let (dataset, stats) = build_dataset(&fixture.config()).unwrap();
    let keyed_hc = dataset.hosts.iter().filter(|h| h.hostname == "hc.gc.ca").count();
    assert_eq!(keyed_hc, 1);
    assert_eq!(host(&dataset.hosts, "hc.gc.ca").subdomains, vec!["www.hc.gc.ca"]);
    assert_eq!(stats.get(WarningType::ParentAsSubdomain), 1);

    let report = run_pipeline(fixture.config()).await.unwrap();
    assert_eq!(report.domains, 2);
    assert_eq!(report.subdomains, 2);

    let store = open_store(&fixture.db_path()).await.unwrap();
    let hosts: Vec<HostRecord> = store.find_all().await.unwrap();
    assert_eq!(hosts.len(), 4);
    let stored: Option<Report> = store.find_one("2024-05-01").await.unwrap();
    assert_eq!(stored.unwrap().totals.https.eligible, 4);
}

#[tokio::test]
async fn test_missing_parent_scan_leaves_store_untouched() {
    let fixture = Fixture::new();
    run_pipeline(fixture.config()).await.unwrap();

    std::fs::remove_file(fixture.root().join(PARENT_PSHTT_CSV)).unwrap();
    let mut config = fixture.config();
    config.report_date = Some("2024-06-01".to_string());
    let err = run_pipeline(config).await.unwrap_err();

    assert!(err.to_string().contains("Failed to load scan data"));
    let missing = err
        .downcast_ref::<MissingInputError>()
        .expect("missing input should be the root cause");
    assert_eq!(missing.source_name, "parent pshtt scan");

    let store = open_store(&fixture.db_path()).await.unwrap();
    let hosts: Vec<HostRecord> = store.find_all().await.unwrap();
    assert_eq!(hosts.len(), 4);
    let reports: Vec<Report> = store.find_all().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_date, "2024-05-01");
}
