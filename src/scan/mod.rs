//! Typed scan rows.
//!
//! A raw [`ScanRow`] is validated once, when the join layer matches it to a
//! tracked host, and turned into a [`PshttScan`] or [`CipherScan`]. The
//! classification engine only ever sees these typed values.

use crate::config::{
    CIPHER_ANY_3DES, CIPHER_ANY_RC4, CIPHER_MARKER, CIPHER_SSLV2, CIPHER_SSLV3, PSHTT_BAD_CHAIN,
    PSHTT_BAD_HOSTNAME, PSHTT_CANONICAL_URL, PSHTT_DEFAULTS_TO_HTTPS, PSHTT_DOWNGRADES_HTTPS,
    PSHTT_HSTS, PSHTT_HSTS_MAX_AGE, PSHTT_HSTS_PRELOADED, PSHTT_HSTS_PRELOAD_READY, PSHTT_LIVE,
    PSHTT_REDIRECT, PSHTT_STRICTLY_FORCES_HTTPS, PSHTT_VALID_HTTPS,
};
use crate::error_handling::MalformedScanRowError;
use crate::load::{parse_flag, ScanRow};

/// HTTPS posture of one host as reported by pshtt.
///
/// Flag fields keep the empty state (`None`) apart from an explicit `False`,
/// since several classification rules test for an explicit false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PshttScan {
    pub hostname: String,
    pub live: bool,
    pub redirect: bool,
    pub canonical_url: String,
    pub downgrades_https: Option<bool>,
    pub valid_https: Option<bool>,
    pub bad_chain: Option<bool>,
    pub bad_hostname: Option<bool>,
    pub strictly_forces_https: Option<bool>,
    pub defaults_to_https: Option<bool>,
    pub hsts: Option<bool>,
    pub hsts_max_age: Option<i64>,
    pub hsts_preloaded: Option<bool>,
    pub hsts_preload_ready: Option<bool>,
}

fn required<'r>(
    row: &'r ScanRow,
    hostname: &str,
    field: &'static str,
) -> Result<&'r str, MalformedScanRowError> {
    row.get(field).ok_or_else(|| MalformedScanRowError {
        hostname: hostname.to_string(),
        field,
        reason: "column missing".to_string(),
    })
}

fn required_flag(
    row: &ScanRow,
    hostname: &str,
    field: &'static str,
) -> Result<Option<bool>, MalformedScanRowError> {
    required(row, hostname, field).map(parse_flag)
}

impl PshttScan {
    /// Validates a pshtt row.
    ///
    /// # Errors
    ///
    /// Returns `MalformedScanRowError` when a mandatory column is absent or
    /// `HSTS Max Age` is neither empty nor an integer.
    pub fn from_row(row: &ScanRow) -> Result<Self, MalformedScanRowError> {
        let hostname = row.hostname();
        let h = hostname.as_str();

        let max_age_raw = required(row, h, PSHTT_HSTS_MAX_AGE)?.trim();
        let hsts_max_age = if max_age_raw.is_empty() {
            None
        } else {
            Some(
                max_age_raw
                    .parse::<i64>()
                    .map_err(|_| MalformedScanRowError {
                        hostname: hostname.clone(),
                        field: PSHTT_HSTS_MAX_AGE,
                        reason: format!("not an integer: '{}'", max_age_raw),
                    })?,
            )
        };

        Ok(Self {
            live: required_flag(row, h, PSHTT_LIVE)?.unwrap_or(false),
            redirect: required_flag(row, h, PSHTT_REDIRECT)?.unwrap_or(false),
            canonical_url: required(row, h, PSHTT_CANONICAL_URL)?.to_string(),
            downgrades_https: required_flag(row, h, PSHTT_DOWNGRADES_HTTPS)?,
            valid_https: required_flag(row, h, PSHTT_VALID_HTTPS)?,
            bad_chain: required_flag(row, h, PSHTT_BAD_CHAIN)?,
            bad_hostname: required_flag(row, h, PSHTT_BAD_HOSTNAME)?,
            strictly_forces_https: required_flag(row, h, PSHTT_STRICTLY_FORCES_HTTPS)?,
            defaults_to_https: required_flag(row, h, PSHTT_DEFAULTS_TO_HTTPS)?,
            hsts: required_flag(row, h, PSHTT_HSTS)?,
            hsts_max_age,
            hsts_preloaded: required_flag(row, h, PSHTT_HSTS_PRELOADED)?,
            hsts_preload_ready: required_flag(row, h, PSHTT_HSTS_PRELOAD_READY)?,
            hostname,
        })
    }

    /// Whether the host itself sits on the HSTS preload list.
    pub fn is_preloaded(&self) -> bool {
        self.hsts_preloaded == Some(true)
    }
}

/// Legacy protocol and weak cipher findings for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherScan {
    pub sslv2: bool,
    pub sslv3: bool,
    pub any_rc4: bool,
    /// Absent from older scan files
    pub any_3des: Option<bool>,
}

impl CipherScan {
    /// Returns `true` if the row's marker column is missing or empty, which
    /// means the scan did not complete.
    pub fn is_incomplete(row: &ScanRow) -> bool {
        row.get(CIPHER_MARKER).map_or(true, |v| v.trim().is_empty())
    }

    /// Validates a cipher scan row. Call [`CipherScan::is_incomplete`] first.
    ///
    /// # Errors
    ///
    /// Returns `MalformedScanRowError` when a mandatory column is absent.
    pub fn from_row(row: &ScanRow) -> Result<Self, MalformedScanRowError> {
        let hostname = row.hostname();
        let h = hostname.as_str();
        Ok(Self {
            sslv2: required_flag(row, h, CIPHER_SSLV2)?.unwrap_or(false),
            sslv3: required_flag(row, h, CIPHER_SSLV3)?.unwrap_or(false),
            any_rc4: required_flag(row, h, CIPHER_ANY_RC4)?.unwrap_or(false),
            any_3des: row.get(CIPHER_ANY_3DES).and_then(parse_flag),
        })
    }
}
