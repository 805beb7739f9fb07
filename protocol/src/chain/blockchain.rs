//! # Blockchain
//!
//! A single canonical chain: an append-only arena of blocks plus a hash
//! index for the skiplist lookups the NiPoPoW prover performs. No forks, no
//! reorgs — once `append` accepts a block, it is immutable and its position
//! is final.

use std::collections::HashMap;
use std::io::{self, Write};

use thiserror::Error;

use crate::chain::block::Block;
use crate::chain::interlink::{ends_with_genesis, next_interlink};
use crate::crypto::hash::Digest;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural rejections from [`Blockchain::append`] and genesis validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("block at height {height} does not extend the tip {tip}")]
    WrongParent { height: u64, tip: Digest },

    #[error("expected height {expected}, got {actual}")]
    WrongHeight { expected: u64, actual: u64 },

    #[error("stored block hash does not match the block contents")]
    HashMismatch,

    #[error("block hash does not meet the difficulty target")]
    TargetNotMet,

    #[error("merkle root does not commit the block's transactions")]
    MerkleMismatch,

    #[error("interlink does not follow from the parent")]
    BadInterlink,

    #[error("genesis block must have no parent and height 0")]
    BadGenesis,
}

// ---------------------------------------------------------------------------
// Header summaries
// ---------------------------------------------------------------------------

/// What an SPV client actually stores per block: enough to anchor a Merkle
/// inclusion path, nothing more.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderSummary {
    pub height: u64,
    pub merkle_root: Digest,
    pub block_hash: Digest,
}

// ---------------------------------------------------------------------------
// Blockchain
// ---------------------------------------------------------------------------

/// The canonical chain, from genesis to tip.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    by_hash: HashMap<Digest, usize>,
    coinbase: u64,
    difficulty: Digest,
}

impl Blockchain {
    /// Start a chain from a mined genesis block.
    pub fn new(genesis: Block, coinbase: u64, difficulty: Digest) -> Result<Self, ChainError> {
        if !genesis.is_genesis() || genesis.height != 0 {
            return Err(ChainError::BadGenesis);
        }
        if genesis.compute_hash() != genesis.block_hash {
            return Err(ChainError::HashMismatch);
        }
        if !genesis.meets_target(&difficulty) {
            return Err(ChainError::TargetNotMet);
        }
        if genesis.interlink != vec![genesis.block_hash] {
            return Err(ChainError::BadInterlink);
        }

        let mut by_hash = HashMap::new();
        by_hash.insert(genesis.block_hash, 0);
        Ok(Blockchain {
            blocks: vec![genesis],
            by_hash,
            coinbase,
            difficulty,
        })
    }

    /// Append a mined block to the tip.
    ///
    /// The block must link to the current tip, carry a consistent hash and
    /// Merkle commitment, satisfy the target, and derive its interlink from
    /// the tip. After this call the block is immutable.
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.tip();
        if block.prev_block != Some(tip.block_hash) {
            return Err(ChainError::WrongParent {
                height: block.height,
                tip: tip.block_hash,
            });
        }
        if block.height != tip.height + 1 {
            return Err(ChainError::WrongHeight {
                expected: tip.height + 1,
                actual: block.height,
            });
        }
        if block.compute_hash() != block.block_hash {
            return Err(ChainError::HashMismatch);
        }
        if !block.meets_target(&self.difficulty) {
            return Err(ChainError::TargetNotMet);
        }
        if block.compute_merkle_root() != block.merkle_root {
            return Err(ChainError::MerkleMismatch);
        }
        if block.interlink != next_interlink(tip, &self.difficulty)
            || !ends_with_genesis(&block.interlink, &self.genesis().block_hash)
        {
            return Err(ChainError::BadInterlink);
        }

        self.by_hash.insert(block.block_hash, self.blocks.len());
        self.blocks.push(block);
        Ok(())
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn difficulty(&self) -> &Digest {
        &self.difficulty
    }

    pub fn coinbase(&self) -> u64 {
        self.coinbase
    }

    pub fn block_at(&self, height: u64) -> Option<&Block> {
        self.blocks.get(height as usize)
    }

    pub fn block_by_hash(&self, hash: &Digest) -> Option<&Block> {
        self.by_hash.get(hash).map(|&idx| &self.blocks[idx])
    }

    /// The stable region `chain[..len−k]`, everything proofs may reference.
    pub fn stable(&self, k: usize) -> &[Block] {
        &self.blocks[..self.len().saturating_sub(k)]
    }

    /// The unstable suffix `chain[len−k..]`, shipped verbatim in proofs.
    pub fn suffix(&self, k: usize) -> &[Block] {
        &self.blocks[self.len().saturating_sub(k)..]
    }

    /// Per-block header summaries, the SPV client's entire view.
    pub fn headers(&self) -> Vec<HeaderSummary> {
        self.blocks
            .iter()
            .map(|b| HeaderSummary {
                height: b.height,
                merkle_root: b.merkle_root,
                block_hash: b.block_hash,
            })
            .collect()
    }

    /// Locate the block holding a transaction, scanning tip-first.
    pub fn find_tx(&self, tx_id: &Digest) -> Option<&Block> {
        self.blocks
            .iter()
            .rev()
            .find(|b| b.find_tx(tx_id).is_some())
    }

    /// Human-readable dump: one stanza per block with its transaction ids.
    pub fn write_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for block in &self.blocks {
            writeln!(out, "block {}", block.height)?;
            writeln!(out, "  timestamp   {}", block.timestamp)?;
            writeln!(out, "  nonce       {}", block.nonce)?;
            writeln!(out, "  merkle root {}", block.merkle_root)?;
            for tx in &block.txs {
                writeln!(out, "  tx          {}", tx.tx_id)?;
            }
        }
        Ok(())
    }
}
