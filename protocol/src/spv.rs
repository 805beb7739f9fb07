//! # Simple Payment Verification
//!
//! The thinnest possible light client: it stores one header summary per
//! block (Merkle root and block hash) and trusts nothing else. To check a
//! transaction it asks a full node for the Merkle inclusion path, re-folds
//! the path locally, and compares the result against its own stored root
//! for that height. The full node can lie about the path all it wants — a
//! wrong path simply fails to reproduce the root.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chain::HeaderSummary;
use crate::crypto::hash::Digest;
use crate::fullnode::FullNode;
use crate::merkle::fold_path;

// ---------------------------------------------------------------------------
// Wire shapes & errors
// ---------------------------------------------------------------------------

/// A full node's answer to a path query: the height of the containing block
/// and the sibling digests from the leaf to just below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResponse {
    pub block_height: u64,
    pub path: Vec<Digest>,
}

/// Why an SPV verification came back negative.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpvError {
    /// The chain commits no transaction with this id (or the id is not even
    /// a well-formed digest).
    #[error("could not find transaction {0}")]
    TxNotFound(String),

    /// The supplied path folds to something other than the stored root.
    #[error("path lead to incorrect root: computed {computed}, stored {stored}")]
    PathMismatch { computed: Digest, stored: Digest },

    /// The full node named a block the client has no header for.
    #[error("no stored header at height {0}")]
    MissingHeader(u64),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An SPV wallet session bound to one full node.
///
/// The header list is captured at construction — the trusted snapshot this
/// client verifies everything against.
pub struct SpvClient<'a> {
    node: &'a FullNode,
    headers: Vec<HeaderSummary>,
}

impl<'a> SpvClient<'a> {
    pub fn new(node: &'a FullNode) -> Self {
        let headers = node.headers();
        debug!(headers = headers.len(), "spv client bootstrapped");
        SpvClient { node, headers }
    }

    /// Verify that the chain commits the transaction named by `raw` (a hex
    /// transaction id, typically pasted by a human). Returns the height of
    /// the committing block on success.
    pub fn verify_transaction(&self, raw: &str) -> Result<u64, SpvError> {
        let tx_id: Digest = raw
            .trim()
            .parse()
            .map_err(|_| SpvError::TxNotFound(raw.trim().to_string()))?;

        let response = self
            .node
            .get_path(&tx_id)
            .ok_or_else(|| SpvError::TxNotFound(tx_id.to_string()))?;
        debug!(
            block_height = response.block_height,
            siblings = response.path.len(),
            "received path from full node"
        );

        let header = self
            .headers
            .get(response.block_height as usize)
            .ok_or(SpvError::MissingHeader(response.block_height))?;

        let computed = fold_path(&tx_id, &response.path);
        if computed != header.merkle_root {
            warn!(%computed, stored = %header.merkle_root, "merkle path mismatch");
            return Err(SpvError::PathMismatch {
                computed,
                stored: header.merkle_root,
            });
        }

        info!(%tx_id, block_height = response.block_height, "transaction verified by spv");
        Ok(response.block_height)
    }
}
