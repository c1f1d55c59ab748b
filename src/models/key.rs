//! RSA key records stored in the key ring.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Result;

/// Smallest modulus the ring will accept, in bytes (512-bit).
const MIN_MODULUS_BYTES: usize = 64;

/// One RSA key record.
///
/// Key material is carried as base64 strings; the private components are
/// optional so a record can hold a public key alone. Records are read,
/// validated, and rehashed by the store but never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsaKeyRecord {
    /// Friendly display label. Not part of key identity.
    #[serde(default)]
    pub label: String,

    /// Base64 modulus (big-endian).
    pub modulus: String,

    /// Base64 public exponent.
    pub public_exponent: String,

    /// Base64 private exponent, present only for private keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_exponent: Option<String>,

    /// Base64 first prime factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime_p: Option<String>,

    /// Base64 second prime factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime_q: Option<String>,
}

impl RsaKeyRecord {
    /// Create a public-only record.
    pub fn new_public(label: impl Into<String>, modulus: &[u8], public_exponent: &[u8]) -> Self {
        Self {
            label: label.into(),
            modulus: BASE64.encode(modulus),
            public_exponent: BASE64.encode(public_exponent),
            private_exponent: None,
            prime_p: None,
            prime_q: None,
        }
    }

    /// Structural validity: every component decodes, the modulus meets the
    /// size floor, and the public exponent is non-empty.
    pub fn is_valid(&self) -> bool {
        let Ok(modulus) = BASE64.decode(&self.modulus) else {
            return false;
        };
        if modulus.len() < MIN_MODULUS_BYTES {
            return false;
        }
        match BASE64.decode(&self.public_exponent) {
            Ok(exponent) if !exponent.is_empty() => {}
            _ => return false,
        }
        for component in [&self.private_exponent, &self.prime_p, &self.prime_q]
            .into_iter()
            .flatten()
        {
            if BASE64.decode(component).is_err() {
                return false;
            }
        }
        true
    }

    /// Modulus size in bits, or 0 when the modulus does not decode.
    pub fn key_bits(&self) -> usize {
        BASE64
            .decode(&self.modulus)
            .map(|m| m.len() * 8)
            .unwrap_or(0)
    }

    /// Whether the record carries private components.
    pub fn has_private(&self) -> bool {
        self.private_exponent.is_some()
    }

    /// A copy with every private component stripped.
    pub fn public_only(&self) -> Self {
        Self {
            label: self.label.clone(),
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
            private_exponent: None,
            prime_p: None,
            prime_q: None,
        }
    }

    /// Canonical serialization used as the hashing input.
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Content hash of the trimmed canonical serialization, hex-encoded.
    /// The store uses this as the record's file name stem.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = self.canonical_json()?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.trim().as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Records compare by key material alone; the label is presentation only.
impl PartialEq for RsaKeyRecord {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus
            && self.public_exponent == other.public_exponent
            && self.private_exponent == other.private_exponent
            && self.prime_p == other.prime_p
            && self.prime_q == other.prime_q
    }
}

impl Eq for RsaKeyRecord {}
