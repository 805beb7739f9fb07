//! # Full Node
//!
//! The service surface a light client talks to. A full node owns a complete
//! chain snapshot and answers three questions:
//!
//! - *Where is this transaction, and what is its Merkle path?* (SPV)
//! - *Give me a succinct proof that your chain is the real one and that it
//!   commits this transaction.* (NiPoPoW)
//! - *What is your current top superchain?* (NiPoPoW client bootstrap)
//!
//! Everything is computed on demand from the owned chain; Merkle trees are
//! rebuilt per query and dropped, nothing is cached.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use tracing::debug;

use crate::chain::{Block, Blockchain, HeaderSummary};
use crate::crypto::hash::Digest;
use crate::merkle::MerkleTree;
use crate::nipopow::prover::{find_top_chain, get_superchain, infix_proof};
use crate::nipopow::{InfixProof, NipopowError};
use crate::spv::PathResponse;

/// A full node: the chain plus the query surface above it.
#[derive(Debug, Clone)]
pub struct FullNode {
    chain: Blockchain,
}

impl FullNode {
    pub fn new(chain: Blockchain) -> Self {
        FullNode { chain }
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn genesis_hash(&self) -> Digest {
        self.chain.genesis().block_hash
    }

    /// The header summaries an SPV client bootstraps from.
    pub fn headers(&self) -> Vec<HeaderSummary> {
        self.chain.headers()
    }

    /// Locate a transaction and produce its Merkle inclusion path, or
    /// `None` when the chain does not commit it anywhere.
    pub fn get_path(&self, tx_id: &Digest) -> Option<PathResponse> {
        let block = self.chain.find_tx(tx_id)?;
        let tree = MerkleTree::from_tx_ids(&block.tx_ids());
        let path = tree.path(tx_id).ok()?;
        debug!(
            %tx_id,
            block_height = block.height,
            path_len = path.len(),
            "serving merkle path"
        );
        Some(PathResponse {
            block_height: block.height,
            path,
        })
    }

    /// Build the infix proof that the chain commits `tx_id`.
    pub fn get_nipopow_proof(
        &self,
        k: usize,
        m: usize,
        tx_id: &Digest,
    ) -> Result<InfixProof, NipopowError> {
        infix_proof(&self.chain, k, m, tx_id)
    }

    /// The current top superchain: the snapshot a NiPoPoW client stores as
    /// its trust anchor.
    pub fn get_top_chain(&self, m: usize, k: usize) -> Vec<Block> {
        let top = find_top_chain(&self.chain, m, k);
        get_superchain(&self.chain, top, k)
    }

    /// Write the human-readable chain dump to `out`.
    pub fn write_transactions<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.chain.write_dump(out)
    }

    /// Dump the chain to a file, creating or truncating it.
    pub fn store_transactions<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_transactions(&mut out)
    }
}
