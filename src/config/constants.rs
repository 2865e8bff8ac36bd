//! Configuration constants.
//!
//! Policy thresholds, scan column names and the conventional layout of the
//! scan output directory.

/// Minimum HSTS max-age (one year, in seconds) for a host to count as having HSTS.
pub const HSTS_MIN_MAX_AGE: i64 = 31_536_000;

/// Default SQLite database path.
pub const DB_PATH: &str = "./https_tracker.db";

/// Marker in the first cell of a header row (compared case-insensitively).
pub const HEADER_MARKER: &str = "domain";

/// Source tag given to every parent domain read from the domains list.
pub const DEFAULT_PARENT_SOURCE: &str = "canada-gov";

/// Discovery sources, in the column order of the gathered-subdomains CSV.
pub const DEFAULT_GATHERERS: &[&str] = &["other", "canada-gov"];

/// Index of the first discovery-source flag column in the gathered-subdomains CSV.
pub const GATHERED_FIRST_SOURCE_COLUMN: usize = 2;

// Domains list column positions
pub const DOMAINS_COLUMN_HOSTNAME: usize = 0;
pub const DOMAINS_COLUMN_ORGANIZATION_EN: usize = 2;
pub const DOMAINS_COLUMN_ORGANIZATION_FR: usize = 3;

// pshtt columns
pub const PSHTT_BASE_DOMAIN: &str = "Base Domain";
pub const PSHTT_LIVE: &str = "Live";
pub const PSHTT_REDIRECT: &str = "Redirect";
pub const PSHTT_CANONICAL_URL: &str = "Canonical URL";
pub const PSHTT_DOWNGRADES_HTTPS: &str = "Downgrades HTTPS";
pub const PSHTT_VALID_HTTPS: &str = "Valid HTTPS";
pub const PSHTT_BAD_CHAIN: &str = "HTTPS Bad Chain";
pub const PSHTT_BAD_HOSTNAME: &str = "HTTPS Bad Hostname";
pub const PSHTT_STRICTLY_FORCES_HTTPS: &str = "Strictly Forces HTTPS";
pub const PSHTT_DEFAULTS_TO_HTTPS: &str = "Defaults to HTTPS";
pub const PSHTT_HSTS: &str = "HSTS";
pub const PSHTT_HSTS_MAX_AGE: &str = "HSTS Max Age";
pub const PSHTT_HSTS_PRELOADED: &str = "HSTS Preloaded";
pub const PSHTT_HSTS_PRELOAD_READY: &str = "HSTS Preload Ready";

// Cipher scan (sslyze) columns
/// Mandatory column; an empty value marks an invalid or incomplete scan.
pub const CIPHER_MARKER: &str = "SSLv2";
pub const CIPHER_SSLV2: &str = "SSLv2";
pub const CIPHER_SSLV3: &str = "SSLv3";
pub const CIPHER_ANY_RC4: &str = "Any RC4";
/// Added to the scanner later; rows from older scans may lack it.
pub const CIPHER_ANY_3DES: &str = "Any 3DES";

// Scan output layout, relative to the data directory
pub const PARENT_DOMAINS_CSV: &str = "parents/cache/domains.csv";
pub const PARENT_PSHTT_CSV: &str = "parents/results/pshtt.csv";
pub const PARENT_CIPHER_CSV: &str = "parents/results/sslyze.csv";
pub const SUBDOMAIN_GATHERED_CSV: &str = "subdomains/gather/results/gathered.csv";
pub const SUBDOMAIN_PSHTT_CSV: &str = "subdomains/scan/results/pshtt.csv";
pub const SUBDOMAIN_CIPHER_CSV: &str = "subdomains/scan/results/sslyze.csv";
