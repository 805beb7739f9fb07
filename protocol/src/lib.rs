// Copyright (c) 2026 Glint Labs. MIT License.
// See LICENSE for details.

//! # GLINT Protocol — Core Library
//!
//! Two light-client verification protocols over one toy proof-of-work
//! chain, side by side:
//!
//! - **SPV** — the client keeps every block header and checks a Merkle
//!   inclusion path against the stored root. Linear state, constant-size
//!   answers.
//! - **NiPoPoW** — the client keeps a logarithmic superchain snapshot and
//!   checks succinct suffix/infix proofs whose every hop is justified by an
//!   interlink slot. Logarithmic state, logarithmic answers.
//!
//! The interesting machinery is the structural stuff that makes both sound:
//! the commutative Merkle combine, the superblock level classification, and
//! the interlink skiplist that `follow_down` descends.
//!
//! ## Architecture
//!
//! - **crypto** — The 160-bit digest, canonical-encoding hash, and the toy
//!   wallet keys.
//! - **transaction** — A minimal UTXO model; blocks need distinct tx ids,
//!   not an economy.
//! - **merkle** — The inclusion-path tree, rebuilt per query.
//! - **chain** — Blocks, interlinks, the canonical chain, and the miner.
//! - **spv** — Header-holding light client plus its path verifier.
//! - **nipopow** — Superchain extraction, suffix/infix provers, and the
//!   two-gate verifier.
//! - **fullnode** — The query surface light clients talk to.
//! - **config** — Constants and demo defaults.
//!
//! ## Design Philosophy
//!
//! 1. Single canonical chain, no forks — reorg logic would drown the part
//!    worth reading.
//! 2. Proofs carry blocks by value and compare them by hash; object
//!    identity proves nothing.
//! 3. Everything deterministic from the chain snapshot; the only randomness
//!    is mining itself.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod fullnode;
pub mod merkle;
pub mod nipopow;
pub mod spv;
pub mod transaction;

pub use chain::{Block, Blockchain};
pub use crypto::hash::Digest;
pub use fullnode::FullNode;
pub use nipopow::{NipopowClient, Verdict};
pub use spv::SpvClient;
