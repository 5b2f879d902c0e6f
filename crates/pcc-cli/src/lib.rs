//! # pcc-cli — Command-Line Front End
//!
//! Provides the `pcc` binary over the audit core.
//!
//! ## Subcommands
//!
//! - `pcc run` — load facts, publish ledger and manifest, print a decision.
//! - `pcc verify` — recompute a ledger root and compare with its manifest.
//! - `pcc diff` — record-level diff of two ledgers.
//! - `pcc canonicalize` — republish an existing ledger in canonical form.
//!
//! ## Output Contract
//!
//! stdout carries exactly one JSON document per invocation. Logs and the
//! short decision reason go to stderr. Exit codes: 0 allow / verified,
//! 1 advisory block / not verified / usage error, 2 enforced block.

pub mod canonicalize;
pub mod config;
pub mod diff;
pub mod facts;
pub mod run;
pub mod session;
pub mod verify;
