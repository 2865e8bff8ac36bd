//! HTTPS compliance classification.
//!
//! [`classify`] is a pure function from one host's typed scan data (plus
//! whether its parent zone is preloaded) to a [`ComplianceVerdict`]. Every
//! state is an enumerated code rather than a boolean so that "present but
//! inadequate" answers survive into the published data.
//!
//! Policy A is the HTTPS + HSTS baseline. Policy B additionally forbids the
//! legacy protocols and ciphers found by the cipher scan; a host with no
//! cipher data gets the benefit of the doubt.

use serde::{Deserialize, Serialize};

use crate::config::HSTS_MIN_MAX_AGE;
use crate::scan::{CipherScan, PshttScan};

/// Defines a fieldless enum stored as its integer code.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(into = "i8", try_from = "i8")]
        #[repr(i8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code),+
        }

        impl $name {
            /// Integer code as published.
            pub fn code(self) -> i8 {
                self as i8
            }
        }

        impl From<$name> for i8 {
            fn from(value: $name) -> i8 {
                value as i8
            }
        }

        impl TryFrom<i8> for $name {
            type Error = String;

            fn try_from(code: i8) -> Result<Self, Self::Error> {
                match code {
                    $(c if c == $code => Ok($name::$variant),)+
                    other => Err(format!("invalid {} code: {}", stringify!($name), other)),
                }
            }
        }
    };
}

coded_enum! {
    /// Whether the host serves HTTPS at all.
    pub enum UsesHttps {
        No = -1,
        /// HTTPS with certificate chain issues
        Partial = 1,
        Yes = 2,
    }
}

coded_enum! {
    /// Whether plain HTTP is redirected to HTTPS.
    pub enum Enforcement {
        NotApplicable = 0,
        PresentNotForced = 1,
        Yes = 2,
        YesStrict = 3,
    }
}

coded_enum! {
    /// Strength of the host's HSTS policy.
    pub enum Hsts {
        NotApplicable = -1,
        No = 0,
        /// Header present, max-age under the threshold
        TooShort = 1,
        Yes = 2,
        /// Granted through the parent zone's preload entry
        YesViaPreload = 3,
    }
}

coded_enum! {
    /// Position on the browser HSTS preload list.
    pub enum PreloadStatus {
        No = 0,
        ReadyForSubmission = 1,
        Yes = 2,
    }
}

coded_enum! {
    /// Cipher scan outcome.
    pub enum CryptoStatus {
        /// No cipher data, or HTTPS unused
        Unknown = -1,
        Fails = 0,
        Passes = 1,
    }
}

/// Legacy protocols and weak ciphers offered by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeakCiphers {
    pub sslv2: bool,
    pub sslv3: bool,
    pub rc4: bool,
    #[serde(rename = "3des")]
    pub triple_des: bool,
}

impl WeakCiphers {
    pub fn any(&self) -> bool {
        self.sslv2 || self.sslv3 || self.rc4 || self.triple_des
    }
}

impl From<&CipherScan> for WeakCiphers {
    fn from(scan: &CipherScan) -> Self {
        Self {
            sslv2: scan.sslv2,
            sslv3: scan.sslv3,
            rc4: scan.any_rc4,
            triple_des: scan.any_3des.unwrap_or(false),
        }
    }
}

/// The compliance verdict for one eligible host.
///
/// The two policy outcomes are derived from the other fields on demand and
/// written alongside them when serialized; they are never read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "VerdictDocument", from = "VerdictDocument")]
pub struct ComplianceVerdict {
    pub uses_https: UsesHttps,
    pub enforcement: Enforcement,
    pub hsts: Hsts,
    pub hsts_max_age: Option<i64>,
    pub preload_status: PreloadStatus,
    pub crypto_status: CryptoStatus,
    /// `Some` exactly when `crypto_status` is known
    pub weak_ciphers: Option<WeakCiphers>,
}

impl ComplianceVerdict {
    /// HTTPS enforced and strong HSTS (directly or via preloading).
    pub fn meets_policy_a(&self) -> bool {
        self.enforcement >= Enforcement::Yes && self.hsts >= Hsts::Yes
    }

    /// Policy A, and no legacy protocols or weak ciphers. Unknown crypto passes.
    pub fn meets_policy_b(&self) -> bool {
        self.meets_policy_a() && self.crypto_status != CryptoStatus::Fails
    }

    /// Whether cipher scan data was used for this verdict.
    pub fn has_crypto_data(&self) -> bool {
        self.crypto_status != CryptoStatus::Unknown
    }
}

/// Serialized shape of a verdict, with the derived policy outcomes included
/// for consumers of the published data.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VerdictDocument {
    uses_https: UsesHttps,
    enforcement: Enforcement,
    hsts: Hsts,
    hsts_max_age: Option<i64>,
    preload_status: PreloadStatus,
    crypto_status: CryptoStatus,
    weak_ciphers: Option<WeakCiphers>,
    #[serde(default)]
    meets_policy_a: bool,
    #[serde(default)]
    meets_policy_b: bool,
}

impl From<ComplianceVerdict> for VerdictDocument {
    fn from(v: ComplianceVerdict) -> Self {
        Self {
            uses_https: v.uses_https,
            enforcement: v.enforcement,
            hsts: v.hsts,
            hsts_max_age: v.hsts_max_age,
            preload_status: v.preload_status,
            crypto_status: v.crypto_status,
            weak_ciphers: v.weak_ciphers,
            meets_policy_a: v.meets_policy_a(),
            meets_policy_b: v.meets_policy_b(),
        }
    }
}

impl From<VerdictDocument> for ComplianceVerdict {
    fn from(d: VerdictDocument) -> Self {
        Self {
            uses_https: d.uses_https,
            enforcement: d.enforcement,
            hsts: d.hsts,
            hsts_max_age: d.hsts_max_age,
            preload_status: d.preload_status,
            crypto_status: d.crypto_status,
            weak_ciphers: d.weak_ciphers,
        }
    }
}

/// Classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    /// Minimum HSTS max-age, in seconds, for `Hsts::Yes`
    pub hsts_min_max_age: i64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            hsts_min_max_age: HSTS_MIN_MAX_AGE,
        }
    }
}

impl Classifier {
    /// Classifies one host. See [`classify`].
    pub fn classify(
        &self,
        pshtt: &PshttScan,
        cipher: Option<&CipherScan>,
        parent_preloaded: bool,
    ) -> ComplianceVerdict {
        let uses_https = uses_https(pshtt);
        let enforcement = enforcement(pshtt, uses_https);
        let hsts = self.hsts(pshtt, uses_https, parent_preloaded);

        let (crypto_status, weak_ciphers) = match cipher {
            Some(scan) if uses_https.code() > 0 => {
                let weak = WeakCiphers::from(scan);
                let status = if weak.any() {
                    CryptoStatus::Fails
                } else {
                    CryptoStatus::Passes
                };
                (status, Some(weak))
            }
            _ => (CryptoStatus::Unknown, None),
        };

        ComplianceVerdict {
            uses_https,
            enforcement,
            hsts,
            hsts_max_age: pshtt.hsts_max_age,
            preload_status: preload_status(pshtt),
            crypto_status,
            weak_ciphers,
        }
    }

    fn hsts(&self, pshtt: &PshttScan, uses_https: UsesHttps, parent_preloaded: bool) -> Hsts {
        if parent_preloaded {
            return Hsts::YesViaPreload;
        }
        if uses_https.code() <= 0 {
            return Hsts::NotApplicable;
        }
        match pshtt.hsts_max_age {
            Some(age) if pshtt.hsts == Some(true) && age != 0 => {
                if age >= self.hsts_min_max_age {
                    Hsts::Yes
                } else {
                    Hsts::TooShort
                }
            }
            _ => Hsts::No,
        }
    }
}

/// Classifies one host with the default thresholds.
///
/// `parent_preloaded` is true only for subdomains whose parent zone is on
/// the preload list; it grants `Hsts::YesViaPreload` regardless of the
/// host's own header.
pub fn classify(
    pshtt: &PshttScan,
    cipher: Option<&CipherScan>,
    parent_preloaded: bool,
) -> ComplianceVerdict {
    Classifier::default().classify(pshtt, cipher, parent_preloaded)
}

fn uses_https(pshtt: &PshttScan) -> UsesHttps {
    if pshtt.downgrades_https == Some(true) {
        UsesHttps::No
    } else if pshtt.valid_https == Some(true) {
        UsesHttps::Yes
    } else if pshtt.bad_chain == Some(true) && pshtt.bad_hostname == Some(false) {
        UsesHttps::Partial
    } else {
        UsesHttps::No
    }
}

fn enforcement(pshtt: &PshttScan, uses_https: UsesHttps) -> Enforcement {
    if uses_https.code() <= 0 {
        return Enforcement::NotApplicable;
    }
    let strict = pshtt.strictly_forces_https;
    let defaults = pshtt.defaults_to_https == Some(true);
    // A pure redirector cannot default to HTTPS for itself, so an immediate
    // redirect counts in its place.
    if strict == Some(true) && (defaults || pshtt.redirect) {
        Enforcement::YesStrict
    } else if strict == Some(false) && defaults {
        Enforcement::Yes
    } else {
        Enforcement::PresentNotForced
    }
}

/// Preload status from a host's own pshtt data, independent of eligibility.
pub fn preload_status(pshtt: &PshttScan) -> PreloadStatus {
    if pshtt.hsts_preloaded == Some(true) {
        PreloadStatus::Yes
    } else if pshtt.hsts_preload_ready == Some(true) {
        PreloadStatus::ReadyForSubmission
    } else {
        PreloadStatus::No
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
