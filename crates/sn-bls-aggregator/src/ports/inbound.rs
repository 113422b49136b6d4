//! # Inbound Ports (Driving Ports / API)
//!
//! The aggregation entry points a node calls and the responder surface its
//! peers call.

use shared_types::{Address, BlsPublicKey, NodePubkey};

use crate::domain::entities::{
    AggregateResult, BlsRegistration, ClaimSubject, MessageParts, SignedReply,
};
use crate::domain::errors::{AggregationError, Rejection};

/// Network-wide aggregation of peer signatures.
///
/// Each call validates the caller's own claim, broadcasts it to every
/// reachable peer and returns once all peers answered, failed or were cut
/// off. Only local validation failures are errors; a round with no
/// contributors returns the identity aggregate.
#[async_trait::async_trait]
pub trait BlsAggregationApi: Send + Sync {
    /// Aggregate signatures over the locally recorded balance of `address`.
    ///
    /// # Errors
    /// * `AggregationError::ZeroAddress` - `address` is the zero address
    /// * `AggregationError::ZeroAmount` - nothing has accrued to `address`
    /// * `AggregationError::HeightAhead` - the balance height is past the chain height
    async fn aggregate_rewards(&self, address: Address)
        -> Result<AggregateResult, AggregationError>;

    /// Aggregate signatures approving the exit of `bls_pubkey`.
    ///
    /// # Errors
    /// * `AggregationError::NullPublicKey` - `bls_pubkey` is all zeroes
    async fn aggregate_exit(
        &self,
        bls_pubkey: BlsPublicKey,
    ) -> Result<AggregateResult, AggregationError>;

    /// Aggregate signatures approving the liquidation of `bls_pubkey`.
    ///
    /// # Errors
    /// * `AggregationError::NullPublicKey` - `bls_pubkey` is all zeroes
    async fn aggregate_liquidation(
        &self,
        bls_pubkey: BlsPublicKey,
    ) -> Result<AggregateResult, AggregationError>;
}

/// Per-node signing service answering peers' aggregation requests.
pub trait SignatureResponder: Send + Sync {
    /// Check the local precondition for `subject` and sign the claim.
    ///
    /// # Errors
    /// * `Rejection::ZeroBalance` - no balance recorded for the address
    /// * `Rejection::HeightAhead` - the balance height is past the local chain height
    /// * `Rejection::NotRemovable` - the key may not exit
    /// * `Rejection::NotLiquidatable` - the key may not be liquidated
    fn respond(&self, subject: ClaimSubject) -> Result<SignedReply, Rejection>;

    /// Decode a raw request for `endpoint` and encode the status and body.
    fn handle(&self, endpoint: &str, parts: &[Vec<u8>]) -> MessageParts;

    /// Registration of this node's BLS key with proof of possession.
    fn registration(&self, sender: Address, node_pubkey: NodePubkey) -> BlsRegistration;
}
