//! # pcc-policy — Decision Engine
//!
//! Turns a run's checks into one allow/block decision document with an exit
//! code. Pure apart from the correlation id and timestamp it stamps.
//!
//! - [`posture`]: `advice` / `enforce` and the `allow` / `block` verdict.
//! - [`decision`]: the engine, the enforced-token set, and the document.
//!
//! Exit codes: 0 allow, 1 block under `advice`, 2 block under `enforce`.

pub mod decision;
pub mod posture;

pub use decision::{
    Decision, DecisionEngine, DecisionRequest, EnforcedTokens, DEFAULT_ENFORCED_TOKENS,
    MAX_CHECKS, RETENTION_WINDOW,
};
pub use posture::{ParsePostureError, Posture, Verdict};
