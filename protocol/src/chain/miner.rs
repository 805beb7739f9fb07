//! # Miner
//!
//! The proof-of-work loop and the demo chain generator. Mining here is the
//! bare contract the rest of the system needs: increment the nonce until the
//! block hash compares below the target, touch nothing else.
//!
//! The generator also plays the role of the network's wallets: every block
//! gets a coinbase to a fresh miner key plus a signed dispersal transaction
//! splitting the reward across new keys, so blocks carry several distinct
//! transaction ids without any mempool machinery.

use tracing::{debug, info};

use crate::chain::block::Block;
use crate::chain::blockchain::Blockchain;
use crate::chain::interlink::{genesis_interlink, next_interlink};
use crate::config::DISPERSAL_OUTPUTS;
use crate::crypto::hash::Digest;
use crate::crypto::keys::WalletKeypair;
use crate::transaction::{Transaction, Utxo};

// ---------------------------------------------------------------------------
// Proof of work
// ---------------------------------------------------------------------------

/// Grind nonces until the block hash satisfies the target, then fix the
/// hash. Mutates only `nonce` and `block_hash`.
pub fn find_pow(block: &mut Block, target: &Digest) {
    loop {
        let hash = block.compute_hash();
        if hash < *target {
            block.block_hash = hash;
            return;
        }
        block.nonce += 1;
    }
}

/// Mine a genesis block: empty transaction list, interlink pointing at
/// itself.
pub fn mine_genesis(target: &Digest) -> Block {
    let mut genesis = Block::new(None, Vec::new());
    find_pow(&mut genesis, target);
    genesis.interlink = genesis_interlink(genesis.block_hash);
    genesis
}

/// Assemble and mine the next block on a chain's tip, interlink included.
/// The caller still appends it.
pub fn next_block(chain: &Blockchain, txs: Vec<Transaction>) -> Block {
    let tip = chain.tip();
    let mut block = Block::new(Some(tip), txs);
    find_pow(&mut block, chain.difficulty());
    block.interlink = next_interlink(tip, chain.difficulty());
    block
}

// ---------------------------------------------------------------------------
// Reward dispersal
// ---------------------------------------------------------------------------

/// Spend a coinbase output into `outputs` fresh wallets. The input carries
/// the miner's signature over its unsigned form; the remainder of an uneven
/// split lands on the last output.
pub fn disperse_coinbase(
    coinbase: &Transaction,
    miner: &WalletKeypair,
    outputs: usize,
) -> Transaction {
    let mut input = coinbase.vout[0].clone();
    input.sign(miner);

    let outputs = outputs.max(1);
    let share = input.value / outputs as u64;
    let remainder = input.value % outputs as u64;

    let vout = (0..outputs)
        .map(|i| {
            let value = if i == outputs - 1 {
                share + remainder
            } else {
                share
            };
            Utxo::new(
                value,
                WalletKeypair::generate().public_hex(),
                (coinbase.tx_id, i as u32),
            )
        })
        .collect();

    Transaction::new(vec![input], vout)
}

/// The transaction list for a freshly mined block: the coinbase plus its
/// dispersal.
pub fn block_transactions(reward: u64, height: u64) -> Vec<Transaction> {
    let miner = WalletKeypair::generate();
    let coinbase = Transaction::coinbase(reward, miner.public_hex(), height);
    let dispersal = disperse_coinbase(&coinbase, &miner, DISPERSAL_OUTPUTS);
    vec![coinbase, dispersal]
}

// ---------------------------------------------------------------------------
// Chain generation
// ---------------------------------------------------------------------------

/// Mine a demo chain of `blocks` blocks (genesis included) under a fixed
/// target, with coinbase-dispersal transactions in every non-genesis block.
pub fn generate_blockchain(blocks: usize, coinbase: u64, difficulty: Digest) -> Blockchain {
    let blocks = blocks.max(1);

    let genesis = mine_genesis(&difficulty);
    debug!(hash = %genesis.block_hash, nonce = genesis.nonce, "mined genesis");

    let mut chain = Blockchain::new(genesis, coinbase, difficulty)
        .expect("freshly mined genesis is consistent");

    for height in 1..blocks as u64 {
        let block = next_block(&chain, block_transactions(coinbase, height));
        debug!(
            height,
            hash = %block.block_hash,
            level = block.level(chain.difficulty()),
            nonce = block.nonce,
            "mined block"
        );
        chain
            .append(block)
            .expect("block mined on the tip always appends");
    }

    info!(
        blocks = chain.len(),
        difficulty = %chain.difficulty(),
        "generated demo chain"
    );
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::interlink::ends_with_genesis;
    use crate::config::{NIPOPOW_DEMO_TARGET, SPV_DEMO_TARGET};
    use std::collections::HashSet;

    fn spv_target() -> Digest {
        SPV_DEMO_TARGET.parse().unwrap()
    }

    #[test]
    fn mined_block_satisfies_the_target() {
        let target = spv_target();
        let mut block = Block::new(None, Vec::new());
        find_pow(&mut block, &target);
        assert!(block.meets_target(&target));
        assert_eq!(block.block_hash, block.compute_hash());
    }

    #[test]
    fn mined_block_does_not_satisfy_a_much_stricter_target() {
        // A solution for one-in-sixteen work should essentially never clear
        // a one-in-2^40 target by accident.
        let target = spv_target();
        let strict: Digest = "0000000000ffffffffffffffffffffffffffffff".parse().unwrap();
        let mut block = Block::new(None, Vec::new());
        find_pow(&mut block, &target);
        assert!(!block.meets_target(&strict));
    }

    #[test]
    fn generated_chain_is_well_linked() {
        let chain = generate_blockchain(8, 25, spv_target());
        assert_eq!(chain.len(), 8);

        let genesis_hash = chain.genesis().block_hash;
        for pair in chain.blocks().windows(2) {
            assert_eq!(pair[1].prev_block, Some(pair[0].block_hash));
            assert_eq!(pair[1].height, pair[0].height + 1);
        }
        for block in chain.blocks() {
            assert!(block.meets_target(chain.difficulty()));
            assert!(ends_with_genesis(&block.interlink, &genesis_hash));
        }
    }

    #[test]
    fn every_block_carries_distinct_transactions() {
        let chain = generate_blockchain(6, 25, spv_target());
        let mut seen = HashSet::new();
        for block in &chain.blocks()[1..] {
            assert_eq!(block.txs.len(), 2);
            assert!(block.txs[0].is_coinbase());
            for tx in &block.txs {
                assert!(seen.insert(tx.tx_id), "duplicate tx id across blocks");
            }
        }
    }

    #[test]
    fn dispersal_conserves_the_reward_and_is_signed() {
        let miner = WalletKeypair::generate();
        let coinbase = Transaction::coinbase(25, miner.public_hex(), 7);
        let dispersal = disperse_coinbase(&coinbase, &miner, 3);

        assert_eq!(dispersal.vin.len(), 1);
        assert_eq!(dispersal.vin[0].verify_signature(), Ok(()));
        assert_eq!(dispersal.vout.iter().map(|o| o.value).sum::<u64>(), 25);
        assert_eq!(dispersal.vout.len(), 3);
    }

    #[test]
    fn loose_target_produces_superblocks() {
        // With a 3-in-8 target the expected level of a block is about one;
        // thirty blocks without a single superblock would be a miracle.
        let target: Digest = NIPOPOW_DEMO_TARGET.parse().unwrap();
        let chain = generate_blockchain(30, 25, target);
        let max_level = chain
            .blocks()
            .iter()
            .map(|b| b.level(chain.difficulty()))
            .max()
            .unwrap();
        assert!(max_level >= 1);
    }
}
