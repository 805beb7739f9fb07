//! # Proof Construction
//!
//! The full-node side of NiPoPoW. All functions work over the stable region
//! of the chain — everything except the last `k` blocks — and clone blocks
//! into the proof, so a proof is self-contained and survives the chain
//! moving on.
//!
//! Superchain extraction uses the inclusive sense: the level-`i` superchain
//! is every stable block of level **at least** `i`. That choice is what
//! makes the flattened proof a connected skiplist: between two adjacent
//! proof blocks there is never an omitted block of a level high enough to
//! have claimed the interlink slot the verifier checks.

use std::collections::BTreeMap;

use tracing::debug;

use crate::chain::{Block, Blockchain};
use crate::crypto::hash::Digest;
use crate::nipopow::{InfixProof, LevelSegment, NipopowError, SuffixProof};

// ---------------------------------------------------------------------------
// Superchain extraction
// ---------------------------------------------------------------------------

/// Count the stable blocks at each exact superblock level.
pub fn super_dist(chain: &Blockchain, k: usize) -> BTreeMap<u32, usize> {
    let target = chain.difficulty();
    let mut dist = BTreeMap::new();
    for block in chain.stable(k) {
        *dist.entry(block.level(target)).or_insert(0) += 1;
    }
    dist
}

/// The highest level populated by at least `m` blocks; 0 when no level
/// qualifies (the level-0 superchain is the whole stable region).
pub fn find_top_chain(chain: &Blockchain, m: usize, k: usize) -> u32 {
    super_dist(chain, k)
        .iter()
        .rev()
        .find(|(_, &count)| count >= m)
        .map(|(&level, _)| level)
        .unwrap_or(0)
}

/// The level-`level` superchain: stable blocks of level ≥ `level`, in
/// chain order.
pub fn get_superchain(chain: &Blockchain, level: u32, k: usize) -> Vec<Block> {
    let target = chain.difficulty();
    chain
        .stable(k)
        .iter()
        .filter(|b| b.level(target) >= level)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Suffix proofs
// ---------------------------------------------------------------------------

/// Build the suffix proof: the full top superchain, the last `m` blocks of
/// every level below it, and the last `k` blocks verbatim. The top segment
/// is inclusive, so blocks rarer than the top level ride along in it.
pub fn suffix_proof(chain: &Blockchain, k: usize, m: usize) -> SuffixProof {
    let top = find_top_chain(chain, m, k);

    let mut prefix = Vec::with_capacity(top as usize + 1);
    prefix.push(LevelSegment {
        level: top,
        blocks: get_superchain(chain, top, k),
    });
    for level in (0..top).rev() {
        let sub = get_superchain(chain, level, k);
        let blocks = if sub.len() >= m {
            sub[sub.len() - m..].to_vec()
        } else {
            sub
        };
        prefix.push(LevelSegment { level, blocks });
    }

    let proof = SuffixProof {
        prefix,
        suffix: chain.suffix(k).to_vec(),
    };
    debug!(
        top_level = top,
        blocks = proof.size(),
        chain_len = chain.len(),
        "built suffix proof"
    );
    proof
}

// ---------------------------------------------------------------------------
// follow_down
// ---------------------------------------------------------------------------

/// Skiplist descent from a high block to a lower target.
///
/// Starting at `hi`, repeatedly jump to the furthest-back interlink entry
/// that is still above `lo`, until some walked block's interlink contains
/// `lo` directly. Returns the intermediate hops plus `lo`, height
/// descending; `hi` itself is not included. Each jump lands on a strict
/// ancestor, so the walk terminates.
pub fn follow_down(chain: &Blockchain, hi: &Block, lo: &Block) -> Vec<Block> {
    let mut bridge: Vec<Block> = Vec::new();
    let mut cursor = hi;

    while !cursor.interlink.contains(&lo.block_hash) {
        let mut descended = false;
        for slot in cursor.interlink.iter().rev() {
            let Some(block) = chain.block_by_hash(slot) else {
                continue;
            };
            if block.height > lo.height {
                if !bridge.iter().any(|b| b.block_hash == block.block_hash) {
                    bridge.push(block.clone());
                }
                cursor = block;
                descended = true;
                break;
            }
        }
        if !descended {
            // Interlink exhausted without passing lo; nothing left to walk.
            break;
        }
    }

    bridge.push(lo.clone());
    bridge.sort_by(|a, b| b.height.cmp(&a.height));
    bridge
}

// ---------------------------------------------------------------------------
// Infix proofs
// ---------------------------------------------------------------------------

/// Build the proof that the chain commits `tx_id`: a suffix proof plus the
/// bridge connecting it down to the committing block.
pub fn infix_proof(
    chain: &Blockchain,
    k: usize,
    m: usize,
    tx_id: &Digest,
) -> Result<InfixProof, NipopowError> {
    let predicate = chain
        .find_tx(tx_id)
        .ok_or_else(|| NipopowError::TxNotFound(tx_id.to_string()))?;

    let suffix_proof = suffix_proof(chain, k, m);
    let flat = suffix_proof.flatten();

    let infix = if flat
        .iter()
        .any(|b| b.block_hash == predicate.block_hash)
    {
        // The suffix proof already vouches for the predicate block.
        vec![predicate.clone()]
    } else {
        // Bridge from the first proof block above the predicate.
        let anchor = flat
            .iter()
            .find(|b| b.height > predicate.height)
            .ok_or(NipopowError::DisconnectedInfix)?;
        let mut bridge = follow_down(chain, anchor, predicate);
        bridge.insert(0, anchor.clone());
        bridge
    };

    debug!(
        %tx_id,
        predicate_height = predicate.height,
        bridge_len = infix.len(),
        "built infix proof"
    );
    Ok(InfixProof {
        suffix_proof,
        infix,
    })
}
