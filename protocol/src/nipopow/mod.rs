//! # Non-Interactive Proofs of Proof-of-Work
//!
//! A NiPoPoW client holds a logarithmic-size snapshot of the chain — the
//! top superchain — instead of every header. A full node proves two things
//! to it:
//!
//! 1. **Suffix proof**: the chain behind the snapshot is the honestly
//!    extended, most-work chain. The proof carries the top superchain, the
//!    last `m` blocks of every lower superblock level, and the last `k`
//!    blocks verbatim.
//! 2. **Infix proof**: some specific transaction is committed in that chain.
//!    The suffix proof is bridged down to the committing block with a
//!    skiplist descent over interlink vectors.
//!
//! The verifier trusts only its stored snapshot and the genesis hash. Every
//! hop in a proof must be justified by an interlink slot of the block above
//! it, and every interlink must terminate in genesis — one severed link and
//! the whole proof is rejected.

pub mod prover;
pub mod verifier;

use thiserror::Error;

use crate::chain::Block;
use crate::crypto::hash::Digest;

pub use prover::{
    find_top_chain, follow_down, get_superchain, infix_proof, suffix_proof, super_dist,
};
pub use verifier::{verify_infix, verify_suffix, NipopowClient, Verdict};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every way a proof can fail, on either side of the conversation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NipopowError {
    /// The prover was asked about a transaction the chain does not commit,
    /// or the proof's predicate block does not contain it.
    #[error("could not find transaction {0}")]
    TxNotFound(String),

    /// The proof's unstable suffix is not exactly `k` blocks long.
    #[error("proof suffix has {actual} blocks, expected {expected}")]
    BadSuffixLength { expected: usize, actual: usize },

    /// The proof's top-level prefix is not the superchain this client has
    /// on record.
    #[error("proof prefix does not match the stored superchain")]
    SuperchainMismatch,

    /// Two height-adjacent proof blocks are not connected by any interlink
    /// slot of the upper one.
    #[error("broken chain link: {lower} is not in the interlink of {upper}")]
    UnanchoredLink { upper: Digest, lower: Digest },

    /// A proof block's interlink does not terminate in the genesis hash.
    #[error("interlink of {0} does not end with the genesis hash")]
    MissingGenesisTail(Digest),

    /// The infix chain does not start at a block the suffix proof vouches
    /// for.
    #[error("infix chain is not connected to the suffix proof")]
    DisconnectedInfix,
}

// ---------------------------------------------------------------------------
// Proof structures
// ---------------------------------------------------------------------------

/// The blocks a proof carries for one superblock level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSegment {
    pub level: u32,
    /// Height-ascending blocks of level ≥ `level` from the stable region.
    pub blocks: Vec<Block>,
}

/// A proof that the prover's chain is the honestly extended one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixProof {
    /// Per-level segments, highest level first. The first segment is the
    /// entire top superchain (inclusive, so it carries every block at or
    /// above the top level); lower levels contribute their last `m`
    /// blocks each.
    pub prefix: Vec<LevelSegment>,
    /// The last `k` blocks of the chain, verbatim.
    pub suffix: Vec<Block>,
}

impl SuffixProof {
    /// The top superchain segment — the part a client compares against its
    /// stored snapshot. `None` only for a malformed proof with no prefix.
    pub fn top_segment(&self) -> Option<&LevelSegment> {
        self.prefix.first()
    }

    /// All carried blocks as one height-descending chain, de-duplicated by
    /// block hash. This is the chain the verifier actually walks.
    pub fn flatten(&self) -> Vec<Block> {
        let mut all: Vec<Block> = self
            .prefix
            .iter()
            .flat_map(|segment| segment.blocks.iter().cloned())
            .chain(self.suffix.iter().cloned())
            .collect();
        // Heights are unique on a single chain, so equal hashes end up
        // adjacent after the sort.
        all.sort_by(|a, b| b.height.cmp(&a.height));
        all.dedup_by(|a, b| a.block_hash == b.block_hash);
        all
    }

    /// Total distinct blocks in the proof.
    pub fn size(&self) -> usize {
        self.flatten().len()
    }
}

/// A suffix proof extended with the bridge down to a predicate block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfixProof {
    pub suffix_proof: SuffixProof,
    /// Height-descending bridge: a block vouched for by the suffix proof,
    /// the interlink hops below it, and finally the block committing the
    /// queried transaction.
    pub infix: Vec<Block>,
}

impl InfixProof {
    /// The block claimed to commit the queried transaction.
    pub fn predicate_block(&self) -> Option<&Block> {
        self.infix.last()
    }
}
