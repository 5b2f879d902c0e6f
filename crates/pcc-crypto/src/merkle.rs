//! # Merkle Accumulator
//!
//! A binary SHA-256 hash tree over an ordered sequence of byte strings
//! (ledger lines, terminators included).
//!
//! ## Algorithm
//!
//! - Leaf: `SHA256(line)`.
//! - Node: `SHA256(left || right)` over the raw 32-byte digests, not hex.
//! - Adjacent nodes are paired left to right. An odd trailing node is paired
//!   **with itself**; it is never promoted unchanged. Levels repeat until one
//!   node remains.
//! - Zero leaves: `SHA256("")`.
//!
//! The self-duplication rule is part of the on-disk contract. Changing it
//! changes every published root.
//!
//! Leaf hashing is a parallel map (`rayon`); results are collected in input
//! order before the reduction, so the root does not depend on scheduling.

use pcc_core::{sha256, Digest};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Core hashing
// ---------------------------------------------------------------------------

/// Leaf digest of one ledger line.
pub fn leaf_hash(line: &[u8]) -> Digest {
    sha256(line)
}

/// Parent digest: `SHA256(left || right)`.
pub fn node_hash(left: &Digest, right: &Digest) -> Digest {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(left.as_bytes());
    input[32..].copy_from_slice(right.as_bytes());
    sha256(&input)
}

/// Root of an empty sequence.
pub fn empty_root() -> Digest {
    sha256(b"")
}

/// Hash every line, in parallel, preserving order.
pub fn leaf_hashes<L>(lines: &[L]) -> Vec<Digest>
where
    L: AsRef<[u8]> + Sync,
{
    lines.par_iter().map(|l| leaf_hash(l.as_ref())).collect()
}

/// Reduce one level to the next, duplicating an odd trailing node.
fn next_level(level: &[Digest]) -> Vec<Digest> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            node_hash(left, right)
        })
        .collect()
}

/// Compute the Merkle root over `lines`.
pub fn merkle_root<L>(lines: &[L]) -> Digest
where
    L: AsRef<[u8]> + Sync,
{
    if lines.is_empty() {
        return empty_root();
    }
    let mut level = leaf_hashes(lines);
    let mut height = 1;
    while level.len() > 1 {
        level = next_level(&level);
        height += 1;
    }
    tracing::debug!(leaves = lines.len(), height, root = %level[0], "merkle root computed");
    level[0]
}

// ---------------------------------------------------------------------------
// Streaming accumulator: O(log n) memory
// ---------------------------------------------------------------------------

/// Incremental form of [`merkle_root`].
///
/// Holds at most one pending node per tree level. `finish()` returns the
/// same root `merkle_root` computes over the same leaves in the same order.
#[derive(Debug, Clone, Default)]
pub struct MerkleAccumulator {
    pending: Vec<Option<Digest>>,
    leaf_count: u64,
}

impl MerkleAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leaves pushed so far.
    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    /// Append one line.
    pub fn push(&mut self, line: &[u8]) {
        self.push_leaf(leaf_hash(line));
    }

    /// Append a precomputed leaf digest.
    pub fn push_leaf(&mut self, leaf: Digest) {
        let mut carry = leaf;
        let mut level = 0;
        loop {
            if level == self.pending.len() {
                self.pending.push(None);
            }
            match self.pending[level].take() {
                None => {
                    self.pending[level] = Some(carry);
                    break;
                }
                Some(left) => {
                    carry = node_hash(&left, &carry);
                    level += 1;
                }
            }
        }
        self.leaf_count += 1;
    }

    /// Close the tree and return its root.
    pub fn finish(&self) -> Digest {
        let top = match self.pending.iter().rposition(Option::is_some) {
            Some(top) => top,
            None => return empty_root(),
        };
        let mut carry: Option<Digest> = None;
        for (level, slot) in self.pending.iter().enumerate().take(top + 1) {
            let below_top = level < top;
            carry = match (slot, carry) {
                (Some(left), Some(right)) => Some(node_hash(left, &right)),
                (Some(node), None) => Some(lone(*node, below_top)),
                (None, Some(node)) => Some(lone(node, below_top)),
                (None, None) => None,
            };
        }
        carry.unwrap_or_else(empty_root)
    }
}

/// A lone node below the top is the odd trailer of its level.
fn lone(node: Digest, below_top: bool) -> Digest {
    if below_top {
        node_hash(&node, &node)
    } else {
        node
    }
}

// ---------------------------------------------------------------------------
// Full tree with inclusion proofs
// ---------------------------------------------------------------------------

/// Which side of the running hash a proof sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sibling is the left operand.
    Left,
    /// Sibling is the right operand.
    Right,
}

/// One step of an inclusion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Position of the sibling relative to the running hash.
    pub side: Side,
    /// The sibling digest. Equal to the running hash where a node was duplicated.
    pub hash: Digest,
}

/// Proof that one ledger line is committed to by a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Zero-based line index.
    pub leaf_index: usize,
    /// Number of lines in the ledger.
    pub leaf_count: usize,
    /// Leaf digest of the proven line.
    pub leaf: Digest,
    /// Sibling path from the leaf to the root.
    pub path: Vec<PathStep>,
}

/// Inclusion proof construction errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProofError {
    /// The tree has no leaves.
    #[error("cannot build a proof over an empty tree")]
    EmptyTree,

    /// Index past the end of the leaves.
    #[error("leaf index {index} out of range for {leaf_count} leaves")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves.
        leaf_count: usize,
    },
}

/// A Merkle tree that keeps every level, for proofs and inspection.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build the tree over `lines`.
    pub fn build<L>(lines: &[L]) -> Self
    where
        L: AsRef<[u8]> + Sync,
    {
        let mut levels = vec![leaf_hashes(lines)];
        while levels.last().map_or(false, |l| l.len() > 1) {
            let next = next_level(&levels[levels.len() - 1]);
            levels.push(next);
        }
        Self { levels }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Number of levels, leaves included. Zero for an empty tree.
    pub fn depth(&self) -> usize {
        if self.leaf_count() == 0 {
            0
        } else {
            self.levels.len()
        }
    }

    /// The root digest.
    pub fn root(&self) -> Digest {
        match self.levels.last() {
            Some(top) if top.len() == 1 => top[0],
            _ => empty_root(),
        }
    }

    /// Leaf digests in ledger order.
    pub fn leaves(&self) -> &[Digest] {
        self.levels.first().map_or(&[], Vec::as_slice)
    }

    /// Build an inclusion proof for the line at `index`.
    pub fn proof(&self, index: usize) -> Result<InclusionProof, ProofError> {
        let leaf_count = self.leaf_count();
        if leaf_count == 0 {
            return Err(ProofError::EmptyTree);
        }
        if index >= leaf_count {
            return Err(ProofError::IndexOutOfRange { index, leaf_count });
        }

        let mut pos = index;
        let mut path = Vec::with_capacity(self.levels.len().saturating_sub(1));
        for level in &self.levels[..self.levels.len() - 1] {
            let step = if pos % 2 == 0 {
                // Odd trailer: its sibling is itself.
                let sibling = level.get(pos + 1).unwrap_or(&level[pos]);
                PathStep {
                    side: Side::Right,
                    hash: *sibling,
                }
            } else {
                PathStep {
                    side: Side::Left,
                    hash: level[pos - 1],
                }
            };
            path.push(step);
            pos /= 2;
        }

        Ok(InclusionProof {
            leaf_index: index,
            leaf_count,
            leaf: self.levels[0][index],
            path,
        })
    }
}

/// Check an inclusion proof against `root`.
///
/// Besides folding the path, this checks that the path has the shape a tree
/// of `leaf_count` leaves would give `leaf_index`: sides match the index
/// bits, the length matches the tree height, and every duplicated trailer
/// really is paired with itself. Malformed proofs return `false`.
pub fn verify_inclusion(proof: &InclusionProof, root: &Digest) -> bool {
    if proof.leaf_count == 0 || proof.leaf_index >= proof.leaf_count {
        return false;
    }

    let mut cur = proof.leaf;
    let mut pos = proof.leaf_index;
    let mut width = proof.leaf_count;
    for step in &proof.path {
        if width <= 1 {
            return false;
        }
        cur = if pos % 2 == 0 {
            if step.side != Side::Right {
                return false;
            }
            if pos + 1 == width && step.hash != cur {
                return false;
            }
            node_hash(&cur, &step.hash)
        } else {
            if step.side != Side::Left {
                return false;
            }
            node_hash(&step.hash, &cur)
        };
        pos /= 2;
        width = width.div_ceil(2);
    }

    width == 1 && cur == *root
}
