//! # pcc-core — Foundational Types for the Audit Core
//!
//! This crate is the leaf of the workspace DAG. It defines the values every
//! other crate passes around: canonical bytes, digests, records, checks,
//! timestamps, tool identity and the error taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every ledger line flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for anything
//!    that gets hashed.
//!
//! 2. **Tagged record envelope.** `Record` is `{type, fields}` over the closed
//!    `serde_json::Value` sum type, so producers stay free-form while the core
//!    only reads the sort-key fields.
//!
//! 3. **UTC-only timestamps.** `Timestamp` renders `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! 4. **Injected tool identity.** Version and revision constants live in
//!    `ToolInfo`, built once at start, never in module-level globals.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pcc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod identity;
pub mod record;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::{lossy_integer, CanonicalBytes};
pub use config::ToolInfo;
pub use digest::{sha256, sha256_canonical, Digest};
pub use error::{CanonicalizationError, DigestError, PccError};
pub use identity::{AssetId, CorrelationId};
pub use record::{Check, FactProducer, Facts, Record};
pub use temporal::Timestamp;
