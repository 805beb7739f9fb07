//! Non-interactive walkthrough of both light-client protocols.
//!
//! Mines a small demo chain, runs an SPV inclusion check against it, then
//! bootstraps a NiPoPoW client and verifies the same transaction through a
//! succinct infix proof — printing the sizes along the way so the point of
//! the second protocol is visible.
//!
//! Run with:
//!   cargo run --example demo -p glint-protocol

use glint_protocol::chain::generate_blockchain;
use glint_protocol::config::{DEFAULT_COINBASE, NIPOPOW_DEMO_TARGET};
use glint_protocol::crypto::hash::Digest;
use glint_protocol::fullnode::FullNode;
use glint_protocol::nipopow::{suffix_proof, NipopowClient, Verdict};
use glint_protocol::spv::SpvClient;

fn main() {
    let difficulty: Digest = NIPOPOW_DEMO_TARGET.parse().expect("valid constant");
    let chain = generate_blockchain(60, DEFAULT_COINBASE, difficulty);
    let node = FullNode::new(chain);
    println!(
        "mined a {}-block chain under target {}",
        node.chain().len(),
        node.chain().difficulty()
    );

    let tx_id = node.chain().blocks()[20].txs[0].tx_id;
    println!("target transaction: {tx_id} (block 20)\n");

    // --- SPV: linear state, one Merkle path ---
    let wallet = SpvClient::new(&node);
    println!(
        "spv client stores {} headers",
        node.headers().len()
    );
    match wallet.verify_transaction(&tx_id.to_string()) {
        Ok(height) => println!("spv accepts: committed in block {height}\n"),
        Err(err) => println!("spv rejects: {err}\n"),
    }

    // --- NiPoPoW: logarithmic state, one succinct proof ---
    let (k, m) = (2, 3);
    let client = NipopowClient::bootstrap(&node, k, m);
    println!(
        "nipopow client stores a {}-digest superchain snapshot",
        client.stored_superchain().len()
    );
    let proof = suffix_proof(node.chain(), k, m);
    println!(
        "suffix proof carries {} of {} blocks",
        proof.size(),
        node.chain().len()
    );
    match client.verify_transaction(&tx_id.to_string()) {
        Verdict::Accept { block_height } => {
            println!("nipopow accepts: committed in block {block_height}")
        }
        Verdict::Reject { reason } => println!("nipopow rejects: {reason}"),
    }
}
