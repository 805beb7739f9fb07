//! # Hashing Primitive
//!
//! Everything in GLINT is identified by a 160-bit SHA-1 digest: transaction
//! ids, Merkle nodes, block hashes, interlink slots. SHA-1 is of course
//! retired for adversarial settings; here the short digest is a feature —
//! proofs stay readable and the proof-of-work loop terminates in
//! microseconds at demo difficulties.
//!
//! Two rules keep every digest in the system reproducible:
//!
//! 1. Structured values are hashed through their **canonical encoding**: the
//!    JSON serialization with struct-declaration field order. Serde gives us
//!    that stable ordering for free.
//! 2. The hash is always computed over the **UTF-8 bytes** of that encoding,
//!    never over some other rendering of it.
//!
//! The module also carries the commutative combining rule used by the Merkle
//! tree: interpret two digests as big-endian integers, add them, and hash the
//! decimal string of the sum. Addition commutes, so a verifier can fold a
//! sibling path without left/right indicators.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest as _, Sha1};
use thiserror::Error;

use crate::config::DIGEST_LENGTH;

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// A 160-bit digest with value semantics.
///
/// Ordering and equality follow the big-endian integer interpretation, which
/// is what the difficulty comparison and the superblock level computation
/// rely on. Renders as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl Digest {
    /// The all-zero digest. Used as the origin of coinbase outputs.
    pub const ZERO: Digest = Digest([0u8; DIGEST_LENGTH]);

    pub fn from_bytes(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Number of leading (most significant) zero bits, 0..=160.
    pub fn leading_zero_bits(&self) -> u32 {
        let mut bits = 0;
        for byte in self.0 {
            if byte == 0 {
                bits += 8;
            } else {
                bits += byte.leading_zeros();
                break;
            }
        }
        bits
    }

    /// The digest as an unsigned big-endian integer.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

/// Failure to parse a digest from its hex rendering.
#[derive(Debug, Error, PartialEq)]
pub enum DigestParseError {
    #[error("digest must be {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_LENGTH * 2 {
            return Err(DigestParseError::Length {
                expected: DIGEST_LENGTH * 2,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s)?;
        let mut out = [0u8; DIGEST_LENGTH];
        out.copy_from_slice(&bytes);
        Ok(Digest(out))
    }
}

// Digests travel through the canonical encoding as hex strings, the same
// rendering shown to humans.
impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the SHA-1 digest of raw bytes. This is `H` — every other hash in
/// the crate bottoms out here.
pub fn sha1_digest(data: &[u8]) -> Digest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut bytes = [0u8; DIGEST_LENGTH];
    bytes.copy_from_slice(&out);
    Digest(bytes)
}

/// Hash a structured value through its canonical encoding.
///
/// The canonical encoding is the JSON serialization with serde's
/// struct-declaration field order; the digest covers its UTF-8 bytes.
pub fn hash_canonical<T: Serialize>(value: &T) -> Digest {
    let encoded = serde_json::to_vec(value).expect("canonical encoding must not fail");
    sha1_digest(&encoded)
}

/// The commutative Merkle combining rule:
/// `H(decimal(int(a) + int(b)))` over big-endian digest integers.
pub fn combine(a: &Digest, b: &Digest) -> Digest {
    let sum = a.to_biguint() + b.to_biguint();
    sha1_digest(sum.to_str_radix(10).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_vector() {
        // SHA-1 of the empty string, straight from RFC 3174.
        let d = sha1_digest(b"");
        assert_eq!(d.to_string(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn hex_round_trip() {
        let d = sha1_digest(b"glint");
        let parsed: Digest = d.to_string().parse().unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "abcd".parse::<Digest>().unwrap_err();
        assert_eq!(
            err,
            DigestParseError::Length {
                expected: 40,
                actual: 4
            }
        );
    }

    #[test]
    fn parse_rejects_non_hex() {
        let bad = "zz".repeat(20);
        assert!(bad.parse::<Digest>().is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        let small: Digest = "0000000000000000000000000000000000000001".parse().unwrap();
        let large: Digest = "0fffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        assert!(small < large);
        assert!(Digest::ZERO < small);
    }

    #[test]
    fn leading_zero_bits_counts_msb_zeros() {
        assert_eq!(Digest::ZERO.leading_zero_bits(), 160);

        let one_nibble: Digest = "0fffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        assert_eq!(one_nibble.leading_zero_bits(), 4);

        let loose: Digest = "5fffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        assert_eq!(loose.leading_zero_bits(), 1);

        let none: Digest = "ffffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        assert_eq!(none.leading_zero_bits(), 0);
    }

    #[test]
    fn combine_is_commutative() {
        let a = sha1_digest(b"left");
        let b = sha1_digest(b"right");
        assert_eq!(combine(&a, &b), combine(&b, &a));
    }

    #[test]
    fn combine_matches_manual_sum() {
        let a = sha1_digest(b"a");
        let b = sha1_digest(b"b");
        let sum = a.to_biguint() + b.to_biguint();
        let expected = sha1_digest(sum.to_str_radix(10).as_bytes());
        assert_eq!(combine(&a, &b), expected);
    }

    #[test]
    fn canonical_hash_is_field_order_sensitive() {
        // Canonical encoding uses declaration order, so reordering fields in
        // a value changes the digest. Tuples make that visible directly.
        let ab = hash_canonical(&("a", "b"));
        let ba = hash_canonical(&("b", "a"));
        assert_ne!(ab, ba);
    }

    #[test]
    fn serde_renders_hex_string() {
        let d = sha1_digest(b"wire");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
