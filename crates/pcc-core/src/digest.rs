//! # Content Digest — SHA-256 Values
//!
//! Defines `Digest`, the fixed 256-bit value used for ledger leaves,
//! Merkle interior nodes, and the published root.
//!
//! Digests are compared and concatenated as raw 32-byte arrays. Hex is only
//! a presentation format (manifest files, verifier output, decision logs).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::DigestError;

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A raw SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render the digest as 64 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-char hex string (case-insensitive, surrounding whitespace ignored).
    pub fn from_hex(s: &str) -> Result<Self, DigestError> {
        let s = s.trim();
        if s.len() != DIGEST_LEN * 2 {
            return Err(DigestError::BadLength(s.len()));
        }
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut out).map_err(|e| DigestError::InvalidHex(e.to_string()))?;
        Ok(Self(out))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 of arbitrary bytes.
pub fn sha256(data: &[u8]) -> Digest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&hash);
    Digest(bytes)
}

/// SHA-256 of a canonical document, trailing newline included.
pub fn sha256_canonical(data: &CanonicalBytes) -> Digest {
    sha256(data.as_bytes())
}
