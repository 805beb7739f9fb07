//! # Chain Model
//!
//! Blocks, the interlink skiplist, the canonical chain, and the miner that
//! extends it. Everything upstream — the SPV path service and the NiPoPoW
//! prover/verifier — reads this module's types through shared snapshots and
//! never mutates them.

pub mod block;
pub mod blockchain;
pub mod interlink;
pub mod miner;

pub use block::Block;
pub use blockchain::{Blockchain, ChainError, HeaderSummary};
pub use interlink::{ends_with_genesis, genesis_interlink, next_interlink};
pub use miner::{find_pow, generate_blockchain, mine_genesis, next_block};
