//! # pcc-crypto — Merkle Accumulator
//!
//! Commits an ordered ledger to a single SHA-256 root.
//!
//! - [`merkle::merkle_root`]: batch root over ledger lines, leaves hashed in
//!   parallel.
//! - [`merkle::MerkleAccumulator`]: the same root, streamed in O(log n) memory.
//! - [`merkle::MerkleTree`]: every level retained, for inclusion proofs.
//!
//! ## Crate Policy
//!
//! - Depends only on `pcc-core` internally.
//! - Tests cross-check roots against an independent `sha2` computation.

pub mod merkle;

pub use merkle::{
    empty_root, leaf_hash, merkle_root, node_hash, verify_inclusion, InclusionProof,
    MerkleAccumulator, MerkleTree, PathStep, ProofError, Side,
};
