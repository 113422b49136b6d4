//! # BLS Primitives (BLS12-381)
//!
//! Signing, verification and aggregation over the 32-byte message hashes.
//!
//! ## Implementation Details
//!
//! - Signatures are on G1 (48 bytes compressed)
//! - Public keys are on G2 (96 bytes compressed)
//!
//! This uses blst's `min_sig` variant for smaller signatures. Every
//! contributor to an aggregate signs the same digest, so aggregates are
//! checked with fast aggregate verification; rogue keys are kept out by the
//! proof of possession each node registers with.

use blst::min_sig::{AggregatePublicKey, AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use shared_types::{BlsPublicKey, BlsSignature};

use super::errors::SignatureError;

/// Domain Separation Tag for hash-to-G1 (proof-of-possession scheme)
pub const DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_";

/// Derive a secret key from at least 32 bytes of key material.
pub fn secret_key_from_ikm(ikm: &[u8]) -> Result<SecretKey, SignatureError> {
    SecretKey::key_gen(ikm, &[]).map_err(|_| SignatureError::KeyGeneration)
}

/// Public key of `sk` in wire form.
pub fn public_key(sk: &SecretKey) -> BlsPublicKey {
    BlsPublicKey::new(sk.sk_to_pk().to_bytes())
}

/// Sign `message` with `sk`.
pub fn sign(sk: &SecretKey, message: &[u8]) -> BlsSignature {
    BlsSignature::new(sk.sign(message, DST, &[]).to_bytes())
}

/// Verify a single BLS signature.
///
/// Returns `false` for undecodable keys or signatures and for the point at
/// infinity.
pub fn verify_bls(message: &[u8], signature: &BlsSignature, public_key: &BlsPublicKey) -> bool {
    let Ok(sig) = Signature::from_bytes(&signature.bytes) else {
        return false;
    };

    let Ok(pk) = PublicKey::from_bytes(&public_key.bytes) else {
        return false;
    };

    sig.verify(true, message, DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS
}

/// Verify an aggregated BLS signature against multiple public keys.
///
/// All signers must have signed the same message. An empty key list never
/// verifies.
pub fn verify_bls_aggregate(
    message: &[u8],
    aggregate_signature: &BlsSignature,
    public_keys: &[BlsPublicKey],
) -> bool {
    if public_keys.is_empty() {
        return false;
    }

    let Ok(sig) = Signature::from_bytes(&aggregate_signature.bytes) else {
        return false;
    };

    let pks: Vec<PublicKey> = public_keys
        .iter()
        .filter_map(|pk| PublicKey::from_bytes(&pk.bytes).ok())
        .collect();

    if pks.len() != public_keys.len() {
        return false; // Some public keys failed to parse
    }

    let pk_refs: Vec<&PublicKey> = pks.iter().collect();
    sig.fast_aggregate_verify(true, message, DST, &pk_refs) == BLST_ERROR::BLST_SUCCESS
}

/// Aggregate multiple BLS signatures into one.
///
/// # Errors
/// * `EmptyAggregation` if the input list is empty
/// * `InvalidFormat` if any signature cannot be parsed
pub fn aggregate_bls_signatures(
    signatures: &[BlsSignature],
) -> Result<BlsSignature, SignatureError> {
    let parsed: Vec<Signature> = signatures
        .iter()
        .map(|sig| Signature::from_bytes(&sig.bytes).map_err(|_| SignatureError::InvalidFormat))
        .collect::<Result<_, _>>()?;

    if parsed.is_empty() {
        return Err(SignatureError::EmptyAggregation);
    }

    let sig_refs: Vec<&Signature> = parsed.iter().collect();
    let aggregate = AggregateSignature::aggregate(&sig_refs, true)
        .map_err(|_| SignatureError::BlsPairingFailed)?;

    Ok(BlsSignature::new(aggregate.to_signature().to_bytes()))
}

/// Aggregate multiple BLS public keys into one.
///
/// # Errors
/// * `EmptyAggregation` if the input list is empty
/// * `InvalidFormat` if any public key cannot be parsed
pub fn aggregate_bls_public_keys(
    public_keys: &[BlsPublicKey],
) -> Result<BlsPublicKey, SignatureError> {
    if public_keys.is_empty() {
        return Err(SignatureError::EmptyAggregation);
    }

    let pks: Vec<PublicKey> = public_keys
        .iter()
        .map(|pk| PublicKey::from_bytes(&pk.bytes).map_err(|_| SignatureError::InvalidFormat))
        .collect::<Result<_, _>>()?;
    let pk_refs: Vec<&PublicKey> = pks.iter().collect();

    let aggregate = AggregatePublicKey::aggregate(&pk_refs, true)
        .map_err(|_| SignatureError::BlsPairingFailed)?;

    Ok(BlsPublicKey::new(aggregate.to_public_key().to_bytes()))
}
