//! # Protocol Constants
//!
//! Every magic number in GLINT lives here. The demo chains are parameterized
//! at instantiation (difficulty, coinbase, block count, k, m), but the values
//! below are the defaults the binaries and the docs agree on.

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// Digest width in bytes. The whole protocol runs on 160-bit SHA-1 digests:
/// block hashes, transaction ids, Merkle nodes, interlink slots.
pub const DIGEST_LENGTH: usize = 20;

/// Digest width in bits, for leading-zero arithmetic.
pub const DIGEST_BITS: u32 = (DIGEST_LENGTH * 8) as u32;

/// Root of the Merkle tree over an empty transaction list. A stored
/// convention, never recomputed: the leading 160 bits of the Bitcoin genesis
/// Merkle root. Only genesis blocks carry it in practice.
pub const EMPTY_TREE_ROOT: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f7667";

// ---------------------------------------------------------------------------
// Proof-of-work targets
// ---------------------------------------------------------------------------

/// Default target for the SPV demo chain. One leading zero nibble, so a
/// block is found after 16 hash attempts on average — instant chains.
pub const SPV_DEMO_TARGET: &str = "0fffffffffffffffffffffffffffffffffffffff";

/// Default target for the NiPoPoW demo chain. Deliberately loose (a hash
/// below it still has a 3-in-8 chance per attempt) so that superblock levels
/// are densely populated even on short chains.
pub const NIPOPOW_DEMO_TARGET: &str = "5fffffffffffffffffffffffffffffffffffffff";

// ---------------------------------------------------------------------------
// Chain parameters
// ---------------------------------------------------------------------------

/// Default miner reward per block.
pub const DEFAULT_COINBASE: u64 = 25;

/// Default number of blocks for a generated demo chain.
pub const DEFAULT_BLOCK_COUNT: usize = 25;

/// How many outputs a coinbase reward is dispersed into. Gives every block
/// more than one transaction without simulating a mempool.
pub const DISPERSAL_OUTPUTS: usize = 3;

// ---------------------------------------------------------------------------
// NiPoPoW security parameters
// ---------------------------------------------------------------------------

/// Default stability parameter `k`: the last `k` blocks of the chain are
/// considered unstable and are excluded from every proof prefix.
pub const DEFAULT_SUFFIX_LEN: usize = 3;

/// Default goodness parameter `m`: the minimum number of blocks a superblock
/// level must hold before the prover treats it as populated.
pub const DEFAULT_GOODNESS: usize = 3;
