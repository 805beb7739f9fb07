//! Cryptographic primitives: the 160-bit hashing core and the toy wallet
//! signing keys.

pub mod hash;
pub mod keys;

pub use hash::{combine, hash_canonical, sha1_digest, Digest, DigestParseError};
pub use keys::{verify_hex, KeyError, WalletKeypair};
