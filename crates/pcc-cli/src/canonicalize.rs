//! # `pcc canonicalize` — Republish an Existing Ledger
//!
//! Parses every non-blank line of a ledger as a record and writes it back
//! through the receipt store: canonical form, sorted, fresh manifest.
//! A line that does not parse is a structural failure and nothing is
//! written.
//!
//! This is a republish, not a line-by-line rewrite. Records without a `ts`
//! field are stamped with the publish time, and lines come out in ledger
//! order rather than input order, so the output can differ in content as
//! well as spelling from the input.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pcc_core::Record;
use pcc_ledger::ReceiptStore;
use serde_json::json;

use crate::facts::read_jsonl;
use crate::session::{PolicyArgs, Session};

/// Arguments for `pcc canonicalize`.
#[derive(Args, Debug)]
pub struct CanonicalizeArgs {
    /// Ledger to re-canonicalize.
    #[arg(long)]
    pub receipts: PathBuf,

    /// Destination ledger.
    #[arg(long)]
    pub out_receipts: PathBuf,

    /// Destination manifest.
    #[arg(long)]
    pub out_root: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Execute `pcc canonicalize`.
///
/// On success prints `{"root":..,"lines":..,"receipts":..,"manifest":..}`
/// and exits 0.
pub fn run_canonicalize(args: &CanonicalizeArgs, session: &Session) -> Result<u8> {
    let records: Vec<Record> = match read_jsonl(&args.receipts) {
        Ok(records) => records,
        Err(e) => return session.fail(session.request(&args.policy, &args.receipts), &e),
    };

    let store = ReceiptStore::new(&args.out_receipts, &args.out_root, session.tool());
    let summary = match store.write(records) {
        Ok(summary) => summary,
        Err(e) => return session.fail(session.request(&args.policy, &args.receipts), &e),
    };

    let out = json!({
        "root": summary.root.to_hex(),
        "lines": summary.lines,
        "receipts": summary.ledger_path.display().to_string(),
        "manifest": summary.manifest_path.display().to_string(),
    });
    println!("{out}");
    Ok(0)
}
