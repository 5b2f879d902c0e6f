//! # pcc-ledger — Receipt Store
//!
//! Publishes and checks the audit ledger:
//!
//! - [`store`]: stamp, canonicalize and sort records, then write the ledger
//!   and its manifest atomically.
//! - [`manifest`]: the `root.txt` format.
//! - [`verify`]: recompute a ledger's root and compare with its manifest.
//! - [`diff`]: record-level comparison of two ledgers.
//!
//! ## Crate Policy
//!
//! - Depends on `pcc-core` and `pcc-crypto` only.
//! - Every hashed byte comes from `CanonicalBytes`.
//! - Filesystem writes go through temp files and renames; no partial output.

pub mod diff;
pub mod manifest;
pub mod store;
pub mod verify;

pub use diff::{diff_files, diff_ledgers, ReceiptDiff};
pub use manifest::Manifest;
pub use store::{render_ledger, LedgerSummary, ReceiptStore};
pub use verify::{split_lines_keepends, verify_bytes, verify_files, VerifyReport};
