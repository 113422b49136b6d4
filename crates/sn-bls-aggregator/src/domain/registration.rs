//! # Proof of Possession
//!
//! A node registers its BLS key together with a signature proving it holds
//! the secret key. Aggregates are verified as same-message aggregates, which
//! is only sound when every key in the set carries such a proof.
//!
//! ```text
//! pop_hash = keccak(pop_tag || bls_pubkey (96) || sender (20) || node_pubkey (32))
//! ```

use shared_types::{Address, BlsPublicKey, FixedBytes, NodePubkey};

use super::bls::verify_bls;
use super::entities::{BlsRegistration, MessageHash};
use super::hashing::keccak256;
use super::tags::DomainTags;

/// Digest signed as proof of possession of `bls_pubkey`'s secret key.
pub fn pop_hash(
    tags: &DomainTags,
    bls_pubkey: &BlsPublicKey,
    sender: &Address,
    node_pubkey: &NodePubkey,
) -> MessageHash {
    keccak256(&[
        tags.pop().as_bytes(),
        bls_pubkey.as_bytes(),
        sender.as_bytes(),
        node_pubkey.as_bytes(),
    ])
}

/// Check a registration's proof of possession on the network `tags` belong to.
pub fn verify_registration(registration: &BlsRegistration, tags: &DomainTags) -> bool {
    let hash = pop_hash(
        tags,
        &registration.bls_pubkey,
        &registration.address,
        &registration.node_pubkey,
    );
    verify_bls(&hash, &registration.proof_of_possession, &registration.bls_pubkey)
}
