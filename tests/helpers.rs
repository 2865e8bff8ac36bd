// Shared test helpers: fixture scan output written into a temporary
// directory laid out like a real scan run.
#![allow(dead_code)] // Each test file uses a subset

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use https_tracker::config::{
    PARENT_CIPHER_CSV, PARENT_DOMAINS_CSV, PARENT_PSHTT_CSV, SUBDOMAIN_CIPHER_CSV,
    SUBDOMAIN_GATHERED_CSV, SUBDOMAIN_PSHTT_CSV,
};
use https_tracker::Config;

pub const PSHTT_HEADER: &str = "Domain,Base Domain,Canonical URL,Live,Redirect,Downgrades HTTPS,\
Valid HTTPS,HTTPS Bad Chain,HTTPS Bad Hostname,Strictly Forces HTTPS,Defaults to HTTPS,HSTS,\
HSTS Max Age,HSTS Preloaded,HSTS Preload Ready";

pub const CIPHER_HEADER: &str = "Domain,Base Domain,SSLv2,SSLv3,Any RC4,Any 3DES";

/// One pshtt result line for a live host serving valid, enforced HTTPS.
pub fn pshtt_line(host: &str, base: &str, max_age: &str, preloaded: bool) -> String {
    let hsts = if max_age.is_empty() { "False" } else { "True" };
    let preloaded = if preloaded { "True" } else { "False" };
    format!(
        "{host},{base},https://{host},True,False,False,True,False,False,True,True,{hsts},{max_age},{preloaded},False"
    )
}

/// One pshtt result line for a host that did not answer.
pub fn dead_pshtt_line(host: &str, base: &str) -> String {
    format!("{host},{base},http://{host},False,False,False,False,False,False,False,False,False,,False,False")
}

pub fn cipher_line(host: &str, base: &str, sslv3: bool) -> String {
    let sslv3 = if sslv3 { "True" } else { "False" };
    format!("{host},{base},False,{sslv3},False,False")
}

/// Writes `lines` to `dir/relative`, creating parent directories.
pub fn write_csv(dir: &Path, relative: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(&path, contents).expect("Failed to write fixture CSV");
    path
}

/// A scan output directory with two organizations:
///
/// - Health Canada: `hc.gc.ca` (compliant, strong ciphers) with
///   `www.hc.gc.ca` (HSTS max-age too short), plus `old.gc.ca` that has
///   no pshtt row and gets removed
/// - Canada Revenue Agency: `cra.gc.ca` (preloaded, offers SSLv3) with
///   `www.cra.gc.ca` (no HSTS header of its own, no cipher data) and
///   `down.cra.gc.ca` (not live)
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path();

        write_csv(
            root,
            PARENT_DOMAINS_CSV,
            &[
                "domain,filler,organization_name_en,organization_name_fr".to_string(),
                "hc.gc.ca,,Health Canada,Santé Canada".to_string(),
                "CRA.gc.ca,,Canada Revenue Agency,Agence du revenu du Canada".to_string(),
                "old.gc.ca,,Health Canada,Santé Canada".to_string(),
            ],
        );
        write_csv(
            root,
            SUBDOMAIN_GATHERED_CSV,
            &[
                "domain,base,other,canada-gov".to_string(),
                "www.hc.gc.ca,hc.gc.ca,True,False".to_string(),
                "www.cra.gc.ca,cra.gc.ca,False,True".to_string(),
                "down.cra.gc.ca,cra.gc.ca,True,True".to_string(),
            ],
        );
        write_csv(
            root,
            PARENT_PSHTT_CSV,
            &[
                PSHTT_HEADER.to_string(),
                pshtt_line("hc.gc.ca", "hc.gc.ca", "31536000", false),
                pshtt_line("cra.gc.ca", "cra.gc.ca", "63072000", true),
                pshtt_line("unlisted.gc.ca", "unlisted.gc.ca", "31536000", false),
            ],
        );
        write_csv(
            root,
            PARENT_CIPHER_CSV,
            &[
                CIPHER_HEADER.to_string(),
                cipher_line("hc.gc.ca", "hc.gc.ca", false),
                cipher_line("cra.gc.ca", "cra.gc.ca", true),
            ],
        );
        write_csv(
            root,
            SUBDOMAIN_PSHTT_CSV,
            &[
                PSHTT_HEADER.to_string(),
                pshtt_line("www.hc.gc.ca", "hc.gc.ca", "100", false),
                pshtt_line("www.cra.gc.ca", "cra.gc.ca", "", false),
                dead_pshtt_line("down.cra.gc.ca", "cra.gc.ca"),
            ],
        );
        write_csv(
            root,
            SUBDOMAIN_CIPHER_CSV,
            &[
                CIPHER_HEADER.to_string(),
                cipher_line("www.hc.gc.ca", "hc.gc.ca", false),
            ],
        );

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Pipeline configuration reading the fixture and publishing to a
    /// database inside the same temporary directory.
    pub fn config(&self) -> Config {
        Config {
            report_date: Some("2024-05-01".to_string()),
            db_path: self.db_path(),
            ..Config::from_data_dir(self.root())
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root().join("tracker.db")
    }
}
