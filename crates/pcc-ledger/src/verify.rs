//! # Ledger Verification
//!
//! Recomputes the Merkle root over a ledger's exact bytes and compares it
//! with the `root:` line of its manifest. Nothing else is needed: no
//! records, no tool state.

use std::fs;
use std::path::Path;

use pcc_core::PccError;
use pcc_crypto::merkle_root;
use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;

/// Outcome of a verification, printed as one JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Whether `computed` equals a non-empty `expected`.
    pub verified: bool,
    /// Root recomputed from the ledger bytes.
    pub computed: String,
    /// Root claimed by the manifest; empty if it has no `root:` line.
    pub expected: String,
}

impl VerifyReport {
    /// Compact single-line JSON, no trailing newline.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"verified":{},"computed":"{}","expected":""}}"#,
                self.verified, self.computed
            )
        })
    }
}

/// Split bytes into lines, each keeping its terminator.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A final line without a
/// terminator is kept as is.
pub fn split_lines_keepends(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&bytes[start..=i]);
                start = i + 1;
            }
            b'\r' => {
                let end = if bytes.get(i + 1) == Some(&b'\n') { i + 1 } else { i };
                lines.push(&bytes[start..=end]);
                i = end;
                start = end + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&bytes[start..]);
    }
    lines
}

/// Verify ledger bytes against manifest text.
pub fn verify_bytes(ledger: &[u8], manifest: &str) -> VerifyReport {
    let computed = merkle_root(&split_lines_keepends(ledger)).to_hex();
    let expected = Manifest::root_from_text(manifest).unwrap_or_default();
    let verified = !expected.is_empty() && computed == expected;
    if !verified {
        tracing::warn!(%computed, %expected, "root mismatch");
    }
    VerifyReport {
        verified,
        computed,
        expected,
    }
}

/// Verify a ledger file against a manifest file.
///
/// # Errors
///
/// `PccError::Io` if either file cannot be read.
pub fn verify_files(ledger: &Path, manifest: &Path) -> Result<VerifyReport, PccError> {
    let ledger_bytes = fs::read(ledger).map_err(|e| PccError::io(ledger, e))?;
    let manifest_bytes = fs::read(manifest).map_err(|e| PccError::io(manifest, e))?;
    Ok(verify_bytes(
        &ledger_bytes,
        &String::from_utf8_lossy(&manifest_bytes),
    ))
}
