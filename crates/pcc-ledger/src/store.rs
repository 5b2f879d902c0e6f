//! # Receipt Store
//!
//! Turns an unordered batch of [`Record`]s into a published ledger:
//!
//! 1. Stamp missing `ts` fields with one timestamp for the whole batch.
//!    Existing timestamps are never touched.
//! 2. Canonicalize every record.
//! 3. Sort by `(asset_id, token_or_key, ts, type)`, ties broken by the
//!    canonical text, so arrival order never shows in the output.
//! 4. Compute the Merkle root over the canonical lines.
//! 5. Stage ledger and manifest as temp files beside their destinations,
//!    then rename both into place.
//!
//! A failure at any step leaves no new ledger behind. If the manifest rename
//! fails after the ledger landed, the ledger that was there before is put
//! back (or the new one removed when there was none), so an earlier
//! ledger/manifest pair stays consistent.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pcc_core::{CanonicalBytes, Digest, PccError, Record, Timestamp, ToolInfo};
use pcc_crypto::merkle_root;
use tempfile::NamedTempFile;

use crate::manifest::Manifest;

/// What a successful [`ReceiptStore::write`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummary {
    /// Merkle root over the ledger lines.
    pub root: Digest,
    /// Number of ledger lines.
    pub lines: usize,
    /// Timestamp used for stamping and for the manifest.
    pub ts: Timestamp,
    /// Where the ledger was written.
    pub ledger_path: PathBuf,
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
}

/// Stamp, canonicalize and order a batch of records. Pure.
///
/// Returns the stamped records in ledger order alongside their canonical
/// lines.
///
/// # Errors
///
/// `PccError::Serialization` if a record cannot be canonicalized.
pub fn render_ledger(
    records: Vec<Record>,
    now: Timestamp,
) -> Result<(Vec<Record>, Vec<CanonicalBytes>), PccError> {
    let mut rows = records
        .into_iter()
        .map(|mut record| -> Result<_, PccError> {
            record.stamp_ts(now);
            let line = CanonicalBytes::new(&record)?;
            Ok((record.sort_key(), line, record))
        })
        .collect::<Result<Vec<_>, _>>()?;

    rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    Ok(rows.into_iter().map(|(_, line, record)| (record, line)).unzip())
}

/// Concatenate canonical lines into ledger bytes.
pub fn ledger_bytes(lines: &[CanonicalBytes]) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines.iter().map(CanonicalBytes::len).sum());
    for line in lines {
        out.extend_from_slice(line.as_bytes());
    }
    out
}

/// Writes a ledger and its manifest to fixed paths.
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    ledger_path: PathBuf,
    manifest_path: PathBuf,
    tool: ToolInfo,
}

impl ReceiptStore {
    /// Create a store writing to `ledger` and `manifest`.
    pub fn new(ledger: impl Into<PathBuf>, manifest: impl Into<PathBuf>, tool: &ToolInfo) -> Self {
        Self {
            ledger_path: ledger.into(),
            manifest_path: manifest.into(),
            tool: tool.clone(),
        }
    }

    /// The conventional layout: `<out>/proof/receipts.jsonl` and `<out>/proof/root.txt`.
    pub fn in_dir(out: &Path, tool: &ToolInfo) -> Self {
        let proof = out.join("proof");
        Self::new(proof.join("receipts.jsonl"), proof.join("root.txt"), tool)
    }

    /// Ledger destination.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Manifest destination.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Write `records` using the current time for stamping.
    ///
    /// # Errors
    ///
    /// `PccError::Serialization` if a record cannot be canonicalized,
    /// `PccError::Io` if either destination cannot be written.
    pub fn write(&self, records: Vec<Record>) -> Result<LedgerSummary, PccError> {
        self.write_at(records, Timestamp::now())
    }

    /// Write `records` stamping with `now`.
    pub fn write_at(&self, records: Vec<Record>, now: Timestamp) -> Result<LedgerSummary, PccError> {
        let (_, lines) = render_ledger(records, now)?;
        let root = merkle_root(&lines);
        let manifest = Manifest {
            root,
            lines: lines.len(),
            ts: now,
            tool_version: self.tool.tool_version.clone(),
            vcs_revision: self.tool.vcs_revision.clone(),
        };

        let ledger_tmp = stage(&self.ledger_path, &ledger_bytes(&lines))?;
        let manifest_tmp = stage(&self.manifest_path, manifest.render().as_bytes())?;
        let previous = self.back_up_ledger()?;

        ledger_tmp
            .persist(&self.ledger_path)
            .map_err(|e| PccError::io(&self.ledger_path, e.error))?;
        if let Err(e) = manifest_tmp.persist(&self.manifest_path) {
            self.roll_back(previous);
            return Err(PccError::io(&self.manifest_path, e.error));
        }

        tracing::debug!(
            root = %root,
            lines = lines.len(),
            ledger = %self.ledger_path.display(),
            "ledger written"
        );

        Ok(LedgerSummary {
            root,
            lines: lines.len(),
            ts: now,
            ledger_path: self.ledger_path.clone(),
            manifest_path: self.manifest_path.clone(),
        })
    }
}

impl ReceiptStore {
    /// Copy the ledger currently at the destination, if any, beside it.
    fn back_up_ledger(&self) -> Result<Option<NamedTempFile>, PccError> {
        match fs::read(&self.ledger_path) {
            Ok(bytes) => stage(&self.ledger_path, &bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PccError::io(&self.ledger_path, e)),
        }
    }

    /// Undo a ledger rename whose manifest never landed.
    fn roll_back(&self, previous: Option<NamedTempFile>) {
        let restoring = previous.is_some();
        let result = match previous {
            Some(backup) => backup.persist(&self.ledger_path).map(drop).map_err(|e| e.error),
            None => fs::remove_file(&self.ledger_path),
        };
        match result {
            Ok(()) => tracing::warn!(
                ledger = %self.ledger_path.display(),
                restored = restoring,
                "manifest rename failed, ledger rolled back"
            ),
            Err(e) => tracing::error!(
                ledger = %self.ledger_path.display(),
                error = %e,
                "manifest rename failed and the ledger could not be rolled back"
            ),
        }
    }
}

/// Write `bytes` to a temp file in `dest`'s directory, creating it if needed.
fn stage(dest: &Path, bytes: &[u8]) -> Result<NamedTempFile, PccError> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PccError::io(dir, e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PccError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| PccError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| PccError::io(tmp.path(), e))?;
    Ok(tmp)
}
