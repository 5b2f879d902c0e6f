//! # pcc CLI entry point
//!
//! Parses command-line arguments, loads configuration and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pcc_core::PccError;
use tracing_subscriber::EnvFilter;

use pcc_cli::canonicalize::{run_canonicalize, CanonicalizeArgs};
use pcc_cli::config::PccConfig;
use pcc_cli::diff::{run_diff, DiffArgs};
use pcc_cli::run::{run_pipeline, RunArgs};
use pcc_cli::session::Session;
use pcc_cli::verify::{run_verify, VerifyArgs};

/// Proof-carrying audit core.
///
/// Publishes fact ledgers with Merkle root manifests, verifies them, and
/// folds checks into allow/block decisions.
#[derive(Parser, Debug)]
#[command(name = "pcc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load facts, publish the ledger and manifest, print a decision.
    Run(RunArgs),

    /// Recompute a ledger's Merkle root and compare it with its manifest.
    Verify(VerifyArgs),

    /// Record-level diff of two ledgers.
    Diff(DiffArgs),

    /// Republish an existing ledger in canonical form with a fresh manifest.
    Canonicalize(CanonicalizeArgs),
}

fn main() -> ExitCode {
    // Usage errors exit 1 so they never look like an enforced block.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // -v flags win; otherwise RUST_LOG, otherwise warn.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout is reserved for the JSON document.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match PccConfig::load(cli.config.as_deref()) {
        Ok(config) => dispatch(&cli.command, &Session::new(config)),
        Err(e) => config_failure(&cli.command, e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(command: &Commands, session: &Session) -> anyhow::Result<u8> {
    tracing::debug!(
        tool = %session.tool().tool,
        version = %session.tool().tool_version,
        revision = %session.tool().vcs_revision,
        "pcc starting"
    );
    match command {
        Commands::Run(args) => run_pipeline(args, session),
        Commands::Verify(args) => run_verify(args),
        Commands::Diff(args) => run_diff(args),
        Commands::Canonicalize(args) => run_canonicalize(args, session),
    }
}

/// Decision-producing commands still print a structural block when the
/// configuration file is unusable; flags alone decide posture and identity.
fn config_failure(command: &Commands, error: anyhow::Error) -> anyhow::Result<u8> {
    let (policy, source) = match command {
        Commands::Run(args) => (&args.policy, &args.records),
        Commands::Canonicalize(args) => (&args.policy, &args.receipts),
        Commands::Verify(_) | Commands::Diff(_) => return Err(error),
    };
    let session = Session::new(PccConfig::default());
    let structural = PccError::Structural(format!("config: {error:#}"));
    session.fail(session.request(policy, source), &structural)
}
