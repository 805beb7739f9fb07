//! # Toy Wallet Keys
//!
//! Ed25519 keypairs for the demo wallet model. Coinbase rewards are
//! dispersed to freshly generated keys, and every spent output carries a
//! signature from the key that owns it — just enough of a signing story to
//! give blocks realistic, distinct transaction contents.
//!
//! Keys and signatures move through transactions in hex, the same rendering
//! the canonical encoding uses for digests.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

/// Errors from decoding or checking wallet signatures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid public key encoding")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("signature does not verify against key {pubkey}")]
    VerificationFailed { pubkey: String },
}

/// A demo wallet keypair. Generated ephemerally; nothing here persists.
pub struct WalletKeypair {
    signing_key: SigningKey,
}

impl WalletKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        WalletKeypair {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// The public key as lowercase hex, the form embedded in outputs.
    pub fn public_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message and return the signature as hex.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.signing_key.sign(message).to_bytes())
    }
}

/// Verify a hex signature over `message` against a hex-encoded public key.
pub fn verify_hex(pubkey_hex: &str, message: &[u8], signature_hex: &str) -> Result<(), KeyError> {
    let key_bytes: [u8; 32] = hex::decode(pubkey_hex)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or(KeyError::InvalidPublicKey)?;
    let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| KeyError::InvalidPublicKey)?;

    let sig_bytes = hex::decode(signature_hex).map_err(|_| KeyError::InvalidSignature)?;
    let signature = Signature::from_slice(&sig_bytes).map_err(|_| KeyError::InvalidSignature)?;

    key.verify(message, &signature)
        .map_err(|_| KeyError::VerificationFailed {
            pubkey: pubkey_hex.to_string(),
        })
}
