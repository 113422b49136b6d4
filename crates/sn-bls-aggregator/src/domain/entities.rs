//! # Domain Entities
//!
//! Claims, peer identities and the values that flow through one aggregation
//! round.

use shared_types::{Address, BlsPublicKey, BlsSignature, FixedBytes, Hash, NodePubkey};
use std::net::SocketAddr;

use super::bls;
use super::errors::AggregationError;

/// The 32-byte digest every peer signs for a claim.
pub type MessageHash = Hash;

/// Raw multi-part message as carried by the transport.
pub type MessageParts = Vec<Vec<u8>>;

/// The kind of claim being attested.
///
/// Determines the domain tag, the endpoint name and the reply field that
/// echoes the claim subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    RewardBalance,
    Exit,
    Liquidation,
}

impl ClaimKind {
    pub const ALL: [ClaimKind; 3] = [
        ClaimKind::RewardBalance,
        ClaimKind::Exit,
        ClaimKind::Liquidation,
    ];

    /// Request endpoint served by every responder for this kind.
    pub fn endpoint(self) -> &'static str {
        match self {
            ClaimKind::RewardBalance => "bls.get_reward_balance",
            ClaimKind::Exit => "bls.get_exit",
            ClaimKind::Liquidation => "bls.get_liquidation",
        }
    }

    /// Reply field that echoes the claim subject.
    ///
    /// Must sort before `"signature"`; reply dictionaries are consumed in key order.
    pub fn subject_field(self) -> &'static str {
        match self {
            ClaimKind::RewardBalance => "address",
            ClaimKind::Exit => "exit",
            ClaimKind::Liquidation => "liquidate",
        }
    }

    /// Label hashed into this kind's domain tag.
    pub fn tag_label(self) -> &'static [u8] {
        match self {
            ClaimKind::RewardBalance => b"BLS_SIG_TRYANDINCREMENT_REWARD",
            ClaimKind::Exit => b"BLS_SIG_TRYANDINCREMENT_REMOVE",
            ClaimKind::Liquidation => b"BLS_SIG_TRYANDINCREMENT_LIQUIDATE",
        }
    }

    /// Short name used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimKind::RewardBalance => "reward",
            ClaimKind::Exit => "exit",
            ClaimKind::Liquidation => "liquidation",
        }
    }

    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.endpoint() == endpoint)
    }
}

/// The subject a requester asks peers to sign for.
///
/// For rewards only the address travels on the wire; each responder looks up
/// the amount and height in its own ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimSubject {
    RewardBalance(Address),
    Exit(BlsPublicKey),
    Liquidation(BlsPublicKey),
}

impl ClaimSubject {
    pub fn kind(&self) -> ClaimKind {
        match self {
            ClaimSubject::RewardBalance(_) => ClaimKind::RewardBalance,
            ClaimSubject::Exit(_) => ClaimKind::Exit,
            ClaimSubject::Liquidation(_) => ClaimKind::Liquidation,
        }
    }
}

/// A fully specified claim. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Claim {
    RewardBalance {
        address: Address,
        amount: u64,
        height: u64,
    },
    Exit {
        bls_pubkey: BlsPublicKey,
    },
    Liquidation {
        bls_pubkey: BlsPublicKey,
    },
}

impl Claim {
    pub fn kind(&self) -> ClaimKind {
        match self {
            Claim::RewardBalance { .. } => ClaimKind::RewardBalance,
            Claim::Exit { .. } => ClaimKind::Exit,
            Claim::Liquidation { .. } => ClaimKind::Liquidation,
        }
    }

    /// Fixed-width bytes sent as the request argument.
    pub fn subject_bytes(&self) -> Vec<u8> {
        match self {
            Claim::RewardBalance { address, .. } => address.as_bytes().to_vec(),
            Claim::Exit { bls_pubkey } | Claim::Liquidation { bls_pubkey } => {
                bls_pubkey.as_bytes().to_vec()
            }
        }
    }
}

/// A service node as seen by the peer directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerIdentity {
    /// Network address the node listens on
    pub address: SocketAddr,
    /// BLS key the node signs with
    pub bls_pubkey: BlsPublicKey,
    /// Non-BLS identity key
    pub node_pubkey: NodePubkey,
}

/// One peer's completion as delivered by the fan-out.
#[derive(Clone, Debug)]
pub struct PeerResponse {
    pub peer: PeerIdentity,
    /// False if the transport failed, timed out or the request was cancelled
    pub success: bool,
    /// Reply parts; empty on failure
    pub data: MessageParts,
}

impl PeerResponse {
    pub fn success(peer: PeerIdentity, data: MessageParts) -> Self {
        Self {
            peer,
            success: true,
            data,
        }
    }

    pub fn failure(peer: PeerIdentity) -> Self {
        Self {
            peer,
            success: false,
            data: Vec::new(),
        }
    }
}

/// A responder's signature over a claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedReply {
    pub claim: Claim,
    pub signature: BlsSignature,
}

/// Outcome of one aggregation round.
///
/// Terminal value: produced once and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateResult {
    /// The caller's claim, never one reported by a peer
    pub claim: Claim,
    /// Digest every contributor signed
    pub message_hash: MessageHash,
    /// Sum of all accepted signatures; the point at infinity if there were none
    pub signature: BlsSignature,
    /// BLS keys of the contributors, in acceptance order
    pub signers: Vec<BlsPublicKey>,
}

impl AggregateResult {
    pub fn contributor_count(&self) -> usize {
        self.signers.len()
    }

    /// Fail unless at least `min_contributors` peers contributed.
    pub fn check_quorum(&self, min_contributors: usize) -> Result<(), AggregationError> {
        if self.signers.len() < min_contributors {
            return Err(AggregationError::InsufficientContributors {
                required: min_contributors,
                actual: self.signers.len(),
            });
        }
        Ok(())
    }

    /// Verify the aggregate against the contributors and the message hash.
    ///
    /// An empty result never verifies.
    pub fn verify(&self) -> bool {
        bls::verify_bls_aggregate(&self.message_hash, &self.signature, &self.signers)
    }

    /// Sum of the contributors' public keys, if any contributed.
    pub fn aggregate_public_key(&self) -> Option<BlsPublicKey> {
        bls::aggregate_bls_public_keys(&self.signers).ok()
    }
}

/// A node's BLS registration with proof of possession of its secret key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsRegistration {
    pub bls_pubkey: BlsPublicKey,
    pub proof_of_possession: BlsSignature,
    /// Address registering the node
    pub address: Address,
    pub node_pubkey: NodePubkey,
}
