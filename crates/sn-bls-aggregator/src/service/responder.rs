//! # Responder
//!
//! Answers peers' aggregation requests: checks the local precondition for the
//! subject, signs the claim hash with this node's key and encodes the reply.
//! Nothing is persisted.

use shared_types::{Address, NodePubkey};
use sn_telemetry::RESPONDER_REPLIES;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::domain::entities::{
    BlsRegistration, Claim, ClaimKind, ClaimSubject, MessageParts, SignedReply,
};
use crate::domain::errors::Rejection;
use crate::domain::hashing::message_hash;
use crate::domain::registration::pop_hash;
use crate::domain::tags::{DomainTags, NetworkIdentity};
use crate::ports::inbound::SignatureResponder;
use crate::ports::outbound::{BlsSigner, EligibilityGateway, LedgerGateway};
use crate::wire::{decode_fixed_arg, encode_signed_reply, error_reply, success_reply};

/// Signs claims that hold on this node.
pub struct BlsResponder<L, E, S> {
    ledger: Arc<L>,
    eligibility: Arc<E>,
    signer: Arc<S>,
    tags: DomainTags,
}

impl<L, E, S> BlsResponder<L, E, S>
where
    L: LedgerGateway,
    E: EligibilityGateway,
    S: BlsSigner,
{
    pub fn new(network: NetworkIdentity, ledger: Arc<L>, eligibility: Arc<E>, signer: Arc<S>) -> Self {
        Self {
            ledger,
            eligibility,
            signer,
            tags: DomainTags::new(network),
        }
    }

    pub fn tags(&self) -> &DomainTags {
        &self.tags
    }

    fn decode_subject(kind: ClaimKind, parts: &[Vec<u8>]) -> Result<ClaimSubject, Rejection> {
        Ok(match kind {
            ClaimKind::RewardBalance => {
                ClaimSubject::RewardBalance(decode_fixed_arg(parts, "BLS rewards", "ETH address")?)
            }
            ClaimKind::Exit => ClaimSubject::Exit(decode_fixed_arg(parts, "BLS exit", "BLS pubkey")?),
            ClaimKind::Liquidation => {
                ClaimSubject::Liquidation(decode_fixed_arg(parts, "BLS liquidation", "BLS pubkey")?)
            }
        })
    }

    fn handle_request(&self, kind: ClaimKind, parts: &[Vec<u8>]) -> Result<Vec<u8>, Rejection> {
        let subject = Self::decode_subject(kind, parts)?;
        let reply = self.respond(subject)?;
        encode_signed_reply(&reply).map_err(|e| Rejection::Internal(e.to_string()))
    }
}

impl<L, E, S> SignatureResponder for BlsResponder<L, E, S>
where
    L: LedgerGateway,
    E: EligibilityGateway,
    S: BlsSigner,
{
    fn respond(&self, subject: ClaimSubject) -> Result<SignedReply, Rejection> {
        let claim = match subject {
            ClaimSubject::RewardBalance(address) => {
                let (height, amount) = self.ledger.get_balance_and_height(&address);
                if amount == 0 {
                    return Err(Rejection::ZeroBalance { address });
                }
                let chain_height = self.ledger.chain_height();
                if height > chain_height {
                    return Err(Rejection::HeightAhead {
                        address,
                        height,
                        chain_height,
                    });
                }
                Claim::RewardBalance {
                    address,
                    amount,
                    height,
                }
            }
            ClaimSubject::Exit(bls_pubkey) => {
                if !self.eligibility.is_removable(&bls_pubkey) {
                    return Err(Rejection::NotRemovable { bls_pubkey });
                }
                Claim::Exit { bls_pubkey }
            }
            ClaimSubject::Liquidation(bls_pubkey) => {
                if !self.eligibility.is_liquidatable(&bls_pubkey) {
                    return Err(Rejection::NotLiquidatable { bls_pubkey });
                }
                Claim::Liquidation { bls_pubkey }
            }
        };

        let hash = message_hash(self.tags.for_kind(claim.kind()), &claim);
        Ok(SignedReply {
            claim,
            signature: self.signer.sign_hash(&hash),
        })
    }

    fn handle(&self, endpoint: &str, parts: &[Vec<u8>]) -> MessageParts {
        trace!(endpoint, "Received signature request");

        let kind = ClaimKind::from_endpoint(endpoint);
        let result = match kind {
            Some(kind) => self.handle_request(kind, parts),
            None => Err(Rejection::BadRequest(format!(
                "Bad request: unknown endpoint {endpoint}"
            ))),
        };

        let reply = match result {
            Ok(body) => success_reply(body),
            Err(rejection) => {
                debug!(endpoint, reason = rejection.reason(), "Refusing signature request: {rejection}");
                error_reply(&rejection)
            }
        };

        let endpoint_label = kind.map_or("unknown", ClaimKind::endpoint);
        let status = String::from_utf8_lossy(&reply[0]);
        RESPONDER_REPLIES
            .with_label_values(&[endpoint_label, &*status])
            .inc();

        reply
    }

    fn registration(&self, sender: Address, node_pubkey: NodePubkey) -> BlsRegistration {
        let bls_pubkey = self.signer.public_key();
        let hash = pop_hash(&self.tags, &bls_pubkey, &sender, &node_pubkey);
        BlsRegistration {
            bls_pubkey,
            proof_of_possession: self.signer.sign_hash(&hash),
            address: sender,
            node_pubkey,
        }
    }
}
