//! # Claim Hashing
//!
//! The exact bytes each peer signs. Responder and validator both call
//! [`message_hash`]; there is no second implementation.
//!
//! ```text
//! reward:       keccak(tag || address (20) || amount (32-byte BE))
//! exit/liquid.: keccak(tag || bls_pubkey (96))
//! ```
//!
//! `tag` is itself `keccak(label || network)`, so the signed digest is a hash
//! over a hash of the domain.

use primitive_types::U256;
use sha3::{Digest, Keccak256};
use shared_types::{FixedBytes, Hash};

use super::entities::{Claim, MessageHash};
use super::tags::DomainTag;

/// Keccak-256 over the concatenation of `parts`.
pub fn keccak256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Amount as a 32-byte big-endian integer.
pub fn encode_amount(amount: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    U256::from(amount).to_big_endian(&mut bytes);
    bytes
}

/// Digest signed for `claim` under `tag`.
pub fn message_hash(tag: &DomainTag, claim: &Claim) -> MessageHash {
    match claim {
        Claim::RewardBalance {
            address, amount, ..
        } => keccak256(&[tag.as_bytes(), address.as_bytes(), &encode_amount(*amount)]),
        Claim::Exit { bls_pubkey } | Claim::Liquidation { bls_pubkey } => {
            keccak256(&[tag.as_bytes(), bls_pubkey.as_bytes()])
        }
    }
}
