//! # Receipt Diff
//!
//! Record-level comparison of two ledgers. Each non-blank line is parsed and
//! re-canonicalized, so two ledgers that differ only in key order or
//! whitespace compare equal. Output lists are sorted by canonical text.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use pcc_core::{lossy_integer, CanonicalBytes, PccError};
use serde::Serialize;
use serde_json::Value;

/// Records present in only one of the two ledgers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptDiff {
    /// In the new ledger only.
    pub added: Vec<Value>,
    /// In the old ledger only.
    pub removed: Vec<Value>,
    /// `added.len()`.
    pub added_count: usize,
    /// `removed.len()`.
    pub removed_count: usize,
}

impl ReceiptDiff {
    /// Whether the two ledgers hold the same records.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Parse and canonicalize every non-blank line of a ledger.
///
/// # Errors
///
/// `PccError::Structural` for a line that is not JSON or that holds an
/// integer outside the 64-bit range.
pub fn canonical_rows(text: &str) -> Result<BTreeSet<CanonicalBytes>, PccError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| -> Result<CanonicalBytes, PccError> {
            if let Some(literal) = lossy_integer(line) {
                return Err(PccError::Structural(format!(
                    "ledger line {}: integer {literal} is outside the 64-bit range",
                    idx + 1
                )));
            }
            let value: Value = serde_json::from_str(line.trim()).map_err(|e| {
                PccError::Structural(format!("ledger line {}: {e}", idx + 1))
            })?;
            Ok(CanonicalBytes::from_value(&value)?)
        })
        .collect()
}

/// Diff two ledgers given as text.
pub fn diff_ledgers(old: &str, new: &str) -> Result<ReceiptDiff, PccError> {
    let old = canonical_rows(old)?;
    let new = canonical_rows(new)?;
    let added = to_values(new.difference(&old))?;
    let removed = to_values(old.difference(&new))?;
    tracing::debug!(added = added.len(), removed = removed.len(), "ledgers diffed");
    Ok(ReceiptDiff {
        added_count: added.len(),
        removed_count: removed.len(),
        added,
        removed,
    })
}

/// Diff two ledger files.
///
/// # Errors
///
/// `PccError::Io` if a file cannot be read, `PccError::Structural` if a line
/// is not JSON.
pub fn diff_files(old: &Path, new: &Path) -> Result<ReceiptDiff, PccError> {
    let read = |path: &Path| fs::read_to_string(path).map_err(|e| PccError::io(path, e));
    diff_ledgers(&read(old)?, &read(new)?)
}

fn to_values<'a>(rows: impl Iterator<Item = &'a CanonicalBytes>) -> Result<Vec<Value>, PccError> {
    rows.map(|row| {
        serde_json::from_str::<Value>(row.as_str())
            .map_err(|e| PccError::Structural(format!("re-reading canonical row: {e}")))
    })
    .collect()
}
