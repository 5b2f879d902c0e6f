//! # `pcc run` — Facts to Ledger and Decision
//!
//! ```bash
//! pcc run --records facts.jsonl --checks checks.jsonl --out build/ --posture enforce
//! ```
//!
//! Loads facts, publishes `<out>/proof/receipts.jsonl` and
//! `<out>/proof/root.txt`, then prints the decision. If loading or writing
//! fails, a structural block is printed instead and nothing is published.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pcc_core::FactProducer;
use pcc_ledger::ReceiptStore;

use crate::facts::JsonlFacts;
use crate::session::{emit, PolicyArgs, Session};

/// Arguments for `pcc run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSONL file of records.
    #[arg(long)]
    pub records: PathBuf,

    /// JSONL file of checks.
    #[arg(long)]
    pub checks: Option<PathBuf>,

    /// Output directory; the ledger lands in `<out>/proof/`.
    #[arg(long)]
    pub out: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Execute `pcc run`. Returns the decision's exit code.
pub fn run_pipeline(args: &RunArgs, session: &Session) -> Result<u8> {
    let request = session.request(&args.policy, &args.records);

    let facts = match JsonlFacts::new(&args.records, args.checks.clone()).produce() {
        Ok(facts) => facts,
        Err(e) => return session.fail(request, &e),
    };

    let store = ReceiptStore::in_dir(&args.out, session.tool());
    match store.write(facts.records) {
        Ok(summary) => {
            tracing::info!(
                root = %summary.root,
                lines = summary.lines,
                ledger = %summary.ledger_path.display(),
                "ledger published"
            );
        }
        Err(e) => return session.fail(request, &e),
    }

    let decision = session.engine().evaluate(request.with_checks(facts.checks));
    emit(&decision)
}
