//! # `pcc diff` — Record-Level Ledger Diff

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pcc_ledger::diff_files;

/// Arguments for `pcc diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Baseline ledger.
    #[arg(long)]
    pub old: PathBuf,

    /// Ledger to compare against the baseline.
    #[arg(long)]
    pub new: PathBuf,
}

/// Execute `pcc diff`. Exits 0 whenever both ledgers parse.
pub fn run_diff(args: &DiffArgs) -> Result<u8> {
    let diff = diff_files(&args.old, &args.new).with_context(|| {
        format!(
            "failed to diff {} against {}",
            args.old.display(),
            args.new.display()
        )
    })?;
    println!("{}", serde_json::to_string(&diff)?);
    Ok(0)
}
