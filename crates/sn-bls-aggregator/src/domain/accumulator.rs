//! # Signature Accumulator
//!
//! Running aggregate of one round. The aggregate point, the contributor list
//! and the seen-set change together in [`SignatureAccumulator::fold`], so a
//! single lock around the accumulator keeps all three consistent.

use blst::min_sig::{AggregateSignature, Signature};
use shared_types::{BlsPublicKey, BlsSignature};
use std::collections::HashSet;
use std::fmt;

use super::errors::ResponseRejection;

/// Accepted signatures and their signers for one aggregation call.
#[derive(Default)]
pub struct SignatureAccumulator {
    aggregate: Option<AggregateSignature>,
    signers: Vec<BlsPublicKey>,
    seen: HashSet<BlsPublicKey>,
}

impl SignatureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an already verified signature into the aggregate.
    ///
    /// A signer is accepted at most once; a repeat leaves the accumulator
    /// untouched.
    pub fn fold(
        &mut self,
        signer: BlsPublicKey,
        signature: &BlsSignature,
    ) -> Result<(), ResponseRejection> {
        if self.seen.contains(&signer) {
            return Err(ResponseRejection::DuplicateContributor { bls_pubkey: signer });
        }

        let invalid = || ResponseRejection::InvalidSignature { bls_pubkey: signer };
        let sig = Signature::from_bytes(&signature.bytes).map_err(|_| invalid())?;

        match self.aggregate.as_mut() {
            Some(aggregate) => aggregate.add_signature(&sig, true).map_err(|_| invalid())?,
            None => self.aggregate = Some(AggregateSignature::from_signature(&sig)),
        }

        self.seen.insert(signer);
        self.signers.push(signer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    pub fn contains(&self, signer: &BlsPublicKey) -> bool {
        self.seen.contains(signer)
    }

    /// The aggregate signature and the signers in acceptance order.
    ///
    /// With no contributions the aggregate is the point at infinity.
    pub fn finish(self) -> (BlsSignature, Vec<BlsPublicKey>) {
        let signature = match self.aggregate {
            Some(aggregate) => BlsSignature::new(aggregate.to_signature().to_bytes()),
            None => BlsSignature::IDENTITY,
        };
        (signature, self.signers)
    }
}

impl fmt::Debug for SignatureAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureAccumulator")
            .field("contributors", &self.signers.len())
            .finish()
    }
}
