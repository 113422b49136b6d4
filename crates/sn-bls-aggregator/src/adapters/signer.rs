//! # Local BLS Signer
//!
//! Holds the node's BLS secret key in memory.

use blst::min_sig::SecretKey;
use shared_types::{BlsPublicKey, BlsSignature};
use std::fmt;

use crate::domain::bls;
use crate::domain::entities::MessageHash;
use crate::domain::errors::SignatureError;
use crate::ports::outbound::BlsSigner;

/// A BLS key pair kept in process memory.
pub struct LocalBlsSigner {
    secret: SecretKey,
    public: BlsPublicKey,
}

impl LocalBlsSigner {
    /// Derive the key pair from at least 32 bytes of key material.
    pub fn from_ikm(ikm: &[u8]) -> Result<Self, SignatureError> {
        let secret = bls::secret_key_from_ikm(ikm)?;
        let public = bls::public_key(&secret);
        Ok(Self { secret, public })
    }

    /// Fresh key pair from OS entropy.
    pub fn random() -> Result<Self, SignatureError> {
        let mut ikm = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut ikm);
        Self::from_ikm(&ikm)
    }
}

impl BlsSigner for LocalBlsSigner {
    fn sign_hash(&self, hash: &MessageHash) -> BlsSignature {
        bls::sign(&self.secret, hash)
    }

    fn public_key(&self) -> BlsPublicKey {
        self.public
    }
}

impl fmt::Debug for LocalBlsSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBlsSigner")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
