//! # Block
//!
//! A block binds an ordered transaction list to the chain through three
//! digests: the parent's block hash, the Merkle root of its own
//! transactions, and — once mining succeeds — its own block hash, which
//! doubles as the proof-of-work artifact.
//!
//! The proof-of-work preimage is the canonical encoding of the block minus
//! `block_hash` and `interlink`: the hash obviously cannot cover itself, and
//! the interlink is attached after mining (it derives from the parent, not
//! from this block's own contents). Mining mutates `nonce` and nothing else.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::crypto::hash::{hash_canonical, Digest};
use crate::merkle::MerkleTree;
use crate::transaction::Transaction;

/// Seconds since the Unix epoch.
pub(crate) fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One block of the chain. Mutable while being assembled and mined;
/// immutable once appended to a [`crate::chain::Blockchain`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Hash of the parent block; `None` only at genesis.
    pub prev_block: Option<Digest>,
    /// Genesis is 0; strictly monotonic along the chain.
    pub height: u64,
    /// Unix seconds at assembly time.
    pub timestamp: u64,
    /// Mutated by the miner until the proof-of-work succeeds.
    pub nonce: u64,
    /// Ordered transactions committed by `merkle_root`.
    pub txs: Vec<Transaction>,
    /// Root of the Merkle tree over `txs`' ids.
    pub merkle_root: Digest,
    /// Digest of the canonical block encoding; fixed by mining.
    pub block_hash: Digest,
    /// Superblock skiplist: slot `i` holds the most recent ancestor of
    /// level ≥ `i`, the final slot always holds the genesis hash.
    pub interlink: Vec<Digest>,
}

/// The slice of a block the proof-of-work digest covers.
#[derive(Serialize)]
struct PowPayload<'a> {
    prev_block: &'a Option<Digest>,
    height: u64,
    timestamp: u64,
    nonce: u64,
    merkle_root: &'a Digest,
    txs: &'a [Transaction],
}

impl Block {
    /// Assemble an unmined block on top of `parent` (or a genesis candidate
    /// when `parent` is `None`). The Merkle root is fixed here; hash and
    /// interlink are filled in by mining and appending.
    pub fn new(parent: Option<&Block>, txs: Vec<Transaction>) -> Self {
        let merkle_root = MerkleTree::from_tx_ids(&tx_ids(&txs)).root();
        Block {
            prev_block: parent.map(|p| p.block_hash),
            height: parent.map(|p| p.height + 1).unwrap_or(0),
            timestamp: now_ts(),
            nonce: 0,
            txs,
            merkle_root,
            block_hash: Digest::ZERO,
            interlink: Vec::new(),
        }
    }

    /// Recompute the proof-of-work digest from the current contents.
    pub fn compute_hash(&self) -> Digest {
        hash_canonical(&PowPayload {
            prev_block: &self.prev_block,
            height: self.height,
            timestamp: self.timestamp,
            nonce: self.nonce,
            merkle_root: &self.merkle_root,
            txs: &self.txs,
        })
    }

    /// Whether the stored hash satisfies the target, i.e. compares strictly
    /// below it as a 160-bit integer.
    pub fn meets_target(&self, target: &Digest) -> bool {
        self.block_hash < *target
    }

    /// Superblock level: how many leading zero bits the proof-of-work
    /// overshot the target by. A block that barely meets the target is
    /// level 0.
    pub fn level(&self, target: &Digest) -> u32 {
        self.block_hash
            .leading_zero_bits()
            .saturating_sub(target.leading_zero_bits())
    }

    /// Recompute the Merkle root over the block's transactions.
    pub fn compute_merkle_root(&self) -> Digest {
        MerkleTree::from_tx_ids(&self.tx_ids()).root()
    }

    /// Ordered transaction ids, the Merkle leaf sequence.
    pub fn tx_ids(&self) -> Vec<Digest> {
        tx_ids(&self.txs)
    }

    /// Find a transaction in this block by id.
    pub fn find_tx(&self, tx_id: &Digest) -> Option<&Transaction> {
        self.txs.iter().find(|tx| tx.tx_id == *tx_id)
    }

    /// True once the chain has linked this block's interlink to genesis.
    pub fn is_genesis(&self) -> bool {
        self.prev_block.is_none()
    }
}

fn tx_ids(txs: &[Transaction]) -> Vec<Digest> {
    txs.iter().map(|tx| tx.tx_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha1_digest;
    use crate::crypto::keys::WalletKeypair;

    fn block_with_txs(n: usize) -> Block {
        let miner = WalletKeypair::generate();
        let txs = (0..n)
            .map(|i| Transaction::coinbase(25, miner.public_hex(), i as u64))
            .collect();
        Block::new(None, txs)
    }

    #[test]
    fn hash_covers_the_nonce() {
        let mut block = block_with_txs(2);
        let before = block.compute_hash();
        block.nonce += 1;
        assert_ne!(before, block.compute_hash());
    }

    #[test]
    fn hash_ignores_hash_and_interlink_fields() {
        let mut block = block_with_txs(2);
        let before = block.compute_hash();
        block.block_hash = sha1_digest(b"scribble");
        block.interlink = vec![sha1_digest(b"slot")];
        assert_eq!(before, block.compute_hash());
    }

    #[test]
    fn merkle_root_matches_transactions() {
        let block = block_with_txs(3);
        assert_eq!(block.merkle_root, block.compute_merkle_root());
    }

    #[test]
    fn level_is_the_leading_zero_surplus() {
        let target: Digest = "0fffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        let mut block = block_with_txs(1);

        // Exactly meets the target's four zero bits: level 0.
        block.block_hash = "0ccccccccccccccccccccccccccccccccccccccc".parse().unwrap();
        assert_eq!(block.level(&target), 0);

        // Eight leading zero bits against four required: level 4.
        block.block_hash = "00cccccccccccccccccccccccccccccccccccccc".parse().unwrap();
        assert_eq!(block.level(&target), 4);
    }

    #[test]
    fn target_comparison_is_strict() {
        let target: Digest = "0fffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        let mut block = block_with_txs(1);
        block.block_hash = target;
        assert!(!block.meets_target(&target));

        block.block_hash = "0ffffffffffffffffffffffffffffffffffffffe".parse().unwrap();
        assert!(block.meets_target(&target));
    }

    #[test]
    fn genesis_has_no_parent_and_height_zero() {
        let genesis = Block::new(None, Vec::new());
        assert!(genesis.is_genesis());
        assert_eq!(genesis.height, 0);

        let child = Block::new(Some(&genesis), Vec::new());
        assert_eq!(child.height, 1);
        assert_eq!(child.prev_block, Some(genesis.block_hash));
    }
}
