//! # Proof Verification
//!
//! The client side of NiPoPoW. A verifier session owns three things it
//! trusts: the top superchain snapshot it stored at bootstrap, the genesis
//! hash, and the parameters `k` and `m`. A received proof moves through two
//! gates — suffix validity, then infix validity — and one failed check at
//! either gate rejects the proof outright. There are no retries; a rejected
//! proof is discarded.

use tracing::{debug, info, warn};

use crate::chain::ends_with_genesis;
use crate::chain::Block;
use crate::crypto::hash::Digest;
use crate::fullnode::FullNode;
use crate::nipopow::{InfixProof, NipopowError, SuffixProof};

// ---------------------------------------------------------------------------
// Chain walking
// ---------------------------------------------------------------------------

/// Check that a height-descending chain excerpt is anchored: every block's
/// interlink terminates in genesis, and every height-adjacent pair is
/// connected through an interlink slot of the upper block.
fn check_anchoring(blocks: &[Block], genesis_hash: &Digest) -> Result<(), NipopowError> {
    for block in blocks {
        if !ends_with_genesis(&block.interlink, genesis_hash) {
            return Err(NipopowError::MissingGenesisTail(block.block_hash));
        }
    }
    for pair in blocks.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        if !upper.interlink.contains(&lower.block_hash) {
            return Err(NipopowError::UnanchoredLink {
                upper: upper.block_hash,
                lower: lower.block_hash,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Suffix & infix verification
// ---------------------------------------------------------------------------

/// Verify a suffix proof against the client's stored state.
///
/// Three checks, in order: the suffix is exactly `k` blocks; the top-level
/// prefix is the stored superchain, block for block; and the flattened
/// proof chain is anchored all the way down.
pub fn verify_suffix(
    proof: &SuffixProof,
    stored_superchain: &[Digest],
    k: usize,
    genesis_hash: &Digest,
) -> Result<(), NipopowError> {
    if proof.suffix.len() != k {
        return Err(NipopowError::BadSuffixLength {
            expected: k,
            actual: proof.suffix.len(),
        });
    }

    let top = proof
        .top_segment()
        .ok_or(NipopowError::SuperchainMismatch)?;
    let top_hashes: Vec<Digest> = top.blocks.iter().map(|b| b.block_hash).collect();
    if top_hashes != stored_superchain {
        return Err(NipopowError::SuperchainMismatch);
    }

    check_anchoring(&proof.flatten(), genesis_hash)?;
    debug!(blocks = proof.size(), "suffix proof valid");
    Ok(())
}

/// Verify an infix proof: the suffix gate first, then the bridge down to
/// the predicate block. Returns the height of the block committing the
/// transaction.
pub fn verify_infix(
    proof: &InfixProof,
    stored_superchain: &[Digest],
    k: usize,
    genesis_hash: &Digest,
    tx_id: &Digest,
) -> Result<u64, NipopowError> {
    verify_suffix(&proof.suffix_proof, stored_superchain, k, genesis_hash)?;

    // The bridge must start at a block the suffix proof vouches for.
    let head = proof.infix.first().ok_or(NipopowError::DisconnectedInfix)?;
    let flat = proof.suffix_proof.flatten();
    if !flat.iter().any(|b| b.block_hash == head.block_hash) {
        return Err(NipopowError::DisconnectedInfix);
    }

    check_anchoring(&proof.infix, genesis_hash)?;

    let predicate = proof
        .predicate_block()
        .ok_or(NipopowError::DisconnectedInfix)?;
    if predicate.find_tx(tx_id).is_none() {
        return Err(NipopowError::TxNotFound(tx_id.to_string()));
    }

    debug!(predicate_height = predicate.height, "infix proof valid");
    Ok(predicate.height)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The outcome of one verification session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The proof checked out; the transaction is committed at this height.
    Accept { block_height: u64 },
    /// Some gate failed; the diagnostic says which.
    Reject { reason: String },
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept { .. })
    }
}

/// A NiPoPoW light client bound to one full node.
///
/// At bootstrap the client stores the node's current top superchain and the
/// genesis hash; from then on every proof must reproduce that snapshot
/// exactly. The stored state is a handful of digests — that is the entire
/// appeal of the protocol.
pub struct NipopowClient<'a> {
    node: &'a FullNode,
    stored_superchain: Vec<Digest>,
    genesis_hash: Digest,
    k: usize,
    m: usize,
}

impl<'a> NipopowClient<'a> {
    /// Capture the trust anchor from a (currently honest) full node.
    pub fn bootstrap(node: &'a FullNode, k: usize, m: usize) -> Self {
        let stored_superchain: Vec<Digest> = node
            .get_top_chain(m, k)
            .iter()
            .map(|b| b.block_hash)
            .collect();
        debug!(
            snapshot = stored_superchain.len(),
            k, m, "nipopow client bootstrapped"
        );
        NipopowClient {
            node,
            stored_superchain,
            genesis_hash: node.genesis_hash(),
            k,
            m,
        }
    }

    /// The stored superchain snapshot, tip-ward last.
    pub fn stored_superchain(&self) -> &[Digest] {
        &self.stored_superchain
    }

    /// Run one full verification session for a (human-supplied) transaction
    /// id: request an infix proof and move it through the suffix and infix
    /// gates.
    pub fn verify_transaction(&self, raw: &str) -> Verdict {
        let raw = raw.trim();
        let Ok(tx_id) = raw.parse::<Digest>() else {
            return Verdict::Reject {
                reason: format!("could not find transaction {raw}"),
            };
        };

        // A prover that cannot even build the proof never reaches the
        // verifier; the session rejects on the spot.
        let proof = match self.node.get_nipopow_proof(self.k, self.m, &tx_id) {
            Ok(proof) => proof,
            Err(err) => {
                info!(%err, "full node returned no proof");
                return Verdict::Reject {
                    reason: err.to_string(),
                };
            }
        };

        match verify_infix(
            &proof,
            &self.stored_superchain,
            self.k,
            &self.genesis_hash,
            &tx_id,
        ) {
            Ok(block_height) => {
                info!(%tx_id, block_height, "transaction verified by nipopow");
                Verdict::Accept { block_height }
            }
            Err(err) => {
                warn!(%err, %tx_id, "proof rejected");
                Verdict::Reject {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::generate_blockchain;
    use crate::chain::Blockchain;
    use crate::config::NIPOPOW_DEMO_TARGET;
    use crate::crypto::hash::sha1_digest;
    use crate::nipopow::prover::{suffix_proof, infix_proof};

    fn demo_chain(blocks: usize) -> Blockchain {
        generate_blockchain(blocks, 25, NIPOPOW_DEMO_TARGET.parse().unwrap())
    }

    fn snapshot(node: &FullNode, m: usize, k: usize) -> Vec<Digest> {
        node.get_top_chain(m, k)
            .iter()
            .map(|b| b.block_hash)
            .collect()
    }

    #[test]
    fn honest_suffix_proof_verifies() {
        let node = FullNode::new(demo_chain(100));
        let (k, m) = (2, 3);
        let stored = snapshot(&node, m, k);

        let proof = suffix_proof(node.chain(), k, m);
        assert_eq!(
            verify_suffix(&proof, &stored, k, &node.genesis_hash()),
            Ok(())
        );
    }

    #[test]
    fn short_suffix_is_rejected() {
        let node = FullNode::new(demo_chain(40));
        let (k, m) = (3, 3);
        let stored = snapshot(&node, m, k);

        let mut proof = suffix_proof(node.chain(), k, m);
        proof.suffix.pop();
        assert_eq!(
            verify_suffix(&proof, &stored, k, &node.genesis_hash()),
            Err(NipopowError::BadSuffixLength {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn foreign_superchain_is_rejected() {
        let node = FullNode::new(demo_chain(40));
        let (k, m) = (2, 3);
        let mut stored = snapshot(&node, m, k);
        stored[0] = sha1_digest(b"someone-elses-chain");

        let proof = suffix_proof(node.chain(), k, m);
        assert_eq!(
            verify_suffix(&proof, &stored, k, &node.genesis_hash()),
            Err(NipopowError::SuperchainMismatch)
        );
    }

    #[test]
    fn mutated_interlink_is_rejected() {
        let node = FullNode::new(demo_chain(60));
        let (k, m) = (2, 3);
        let stored = snapshot(&node, m, k);

        let mut proof = suffix_proof(node.chain(), k, m);
        // Flip one bit in one interlink entry: the genesis tail of the
        // first suffix block.
        let victim = &mut proof.suffix[0];
        let tail = victim.interlink.len() - 1;
        let mut bytes = *victim.interlink[tail].as_bytes();
        bytes[0] ^= 0x01;
        victim.interlink[tail] = Digest::from_bytes(bytes);

        let err = verify_suffix(&proof, &stored, k, &node.genesis_hash()).unwrap_err();
        assert!(matches!(err, NipopowError::MissingGenesisTail(_)));
    }

    // A hand-built three-block proof, small enough to break one specific
    // link and watch the verifier name it.
    #[test]
    fn severed_pair_link_is_rejected() {
        use crate::chain::Block;
        use crate::nipopow::LevelSegment;

        fn stub(height: u64, tag: &[u8], interlink: Vec<Digest>) -> Block {
            let mut block = Block::new(None, Vec::new());
            block.height = height;
            block.block_hash = sha1_digest(tag);
            block.interlink = interlink;
            block
        }

        let g_hash = sha1_digest(b"g");
        let genesis = stub(0, b"g", vec![g_hash]);
        let a = stub(1, b"a", vec![g_hash, g_hash]);
        let b = stub(2, b"b", vec![a.block_hash, g_hash]);

        let stored = vec![genesis.block_hash, a.block_hash];
        let proof = SuffixProof {
            prefix: vec![LevelSegment {
                level: 0,
                blocks: vec![genesis.clone(), a.clone()],
            }],
            suffix: vec![b.clone()],
        };
        assert_eq!(verify_suffix(&proof, &stored, 1, &g_hash), Ok(()));

        // Point b's only link at something that is not a.
        let mut severed = proof.clone();
        severed.suffix[0].interlink[0] = sha1_digest(b"elsewhere");
        assert_eq!(
            verify_suffix(&severed, &stored, 1, &g_hash),
            Err(NipopowError::UnanchoredLink {
                upper: b.block_hash,
                lower: a.block_hash,
            })
        );
    }

    #[test]
    fn infix_proof_for_committed_transaction_verifies() {
        let node = FullNode::new(demo_chain(100));
        let (k, m) = (2, 3);
        let stored = snapshot(&node, m, k);

        let tx_id = node.chain().blocks()[20].txs[0].tx_id;
        let proof = infix_proof(node.chain(), k, m, &tx_id).unwrap();
        assert_eq!(
            verify_infix(&proof, &stored, k, &node.genesis_hash(), &tx_id),
            Ok(20)
        );
    }

    #[test]
    fn disconnected_bridge_is_rejected() {
        let node = FullNode::new(demo_chain(60));
        let (k, m) = (2, 3);
        let stored = snapshot(&node, m, k);

        let tx_id = node.chain().blocks()[10].txs[0].tx_id;
        let mut proof = infix_proof(node.chain(), k, m, &tx_id).unwrap();
        // Replace the bridge head with a block the suffix proof never
        // vouched for.
        let mut rogue = proof.infix[0].clone();
        rogue.block_hash = sha1_digest(b"unvouched");
        proof.infix[0] = rogue;

        let err = verify_infix(&proof, &stored, k, &node.genesis_hash(), &tx_id).unwrap_err();
        assert!(matches!(
            err,
            NipopowError::DisconnectedInfix | NipopowError::UnanchoredLink { .. }
        ));
    }

    #[test]
    fn predicate_without_the_transaction_is_rejected() {
        let node = FullNode::new(demo_chain(60));
        let (k, m) = (2, 3);
        let stored = snapshot(&node, m, k);

        let tx_id = node.chain().blocks()[10].txs[0].tx_id;
        let other = node.chain().blocks()[11].txs[0].tx_id;
        let proof = infix_proof(node.chain(), k, m, &tx_id).unwrap();

        // Same proof, different claim: rejected at the predicate gate.
        let err = verify_infix(&proof, &stored, k, &node.genesis_hash(), &other).unwrap_err();
        assert_eq!(err, NipopowError::TxNotFound(other.to_string()));
    }

    #[test]
    fn client_sessions_are_idempotent() {
        let node = FullNode::new(demo_chain(50));
        let client = NipopowClient::bootstrap(&node, 2, 3);
        let tx_id = node.chain().blocks()[7].txs[1].tx_id.to_string();

        let first = client.verify_transaction(&tx_id);
        let second = client.verify_transaction(&tx_id);
        assert!(first.is_accept());
        assert_eq!(first, second);
    }

    #[test]
    fn client_rejects_garbage_input_without_a_proof_round() {
        let node = FullNode::new(demo_chain(30));
        let client = NipopowClient::bootstrap(&node, 2, 3);
        let verdict = client.verify_transaction("MISSING");
        assert_eq!(
            verdict,
            Verdict::Reject {
                reason: "could not find transaction MISSING".to_string()
            }
        );
    }
}
