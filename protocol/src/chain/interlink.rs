//! # Interlink
//!
//! The per-block pointer vector that makes logarithmic proofs possible.
//! Slot `i` of a block's interlink holds the block hash of the most recent
//! strict ancestor whose superblock level is at least `i`; the final slot is
//! pinned to the genesis hash. Rare, high-level ancestors therefore stay
//! reachable in one hop, which is exactly the skiplist structure the
//! NiPoPoW `follow_down` descent walks.
//!
//! The vector only grows when a newly mined parent sets a level record.

use crate::chain::block::Block;
use crate::crypto::hash::Digest;

/// The interlink of the genesis block: a single slot holding its own hash.
pub fn genesis_interlink(genesis_hash: Digest) -> Vec<Digest> {
    vec![genesis_hash]
}

/// Derive a child's interlink from its mined parent.
///
/// Copies the parent's vector, widens it when the parent's level exceeds
/// every slot seen so far, and overwrites slots `0..=level` with the
/// parent's hash. Slots above the parent's level carry over untouched, and
/// the genesis slot stays last.
pub fn next_interlink(parent: &Block, target: &Digest) -> Vec<Digest> {
    let mut interlink = parent.interlink.clone();
    let level = parent.level(target) as usize;

    // Slot count excluding the genesis tail.
    let num_levels = interlink.len() - 1;
    if level + 1 > num_levels {
        let genesis = interlink.pop().expect("interlink always carries genesis");
        interlink.resize(level + 1, parent.block_hash);
        interlink.push(genesis);
    }

    for slot in interlink.iter_mut().take(level + 1) {
        *slot = parent.block_hash;
    }
    interlink
}

/// The tail-slot invariant every valid interlink satisfies.
pub fn ends_with_genesis(interlink: &[Digest], genesis_hash: &Digest) -> bool {
    interlink.last() == Some(genesis_hash)
}
