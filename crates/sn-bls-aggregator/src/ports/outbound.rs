//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators this subsystem depends on: the ledger, eligibility policy,
//! the peer directory, the node's own BLS key and the message transport.

use shared_types::{Address, BlsPublicKey, BlsSignature};
use thiserror::Error;

use crate::domain::entities::{MessageHash, MessageParts, PeerIdentity};

/// Failure delivering a request or receiving its reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No connection could be established
    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    /// The peer did not answer in time
    #[error("Request timed out")]
    Timeout,

    /// The connection closed before a reply arrived
    #[error("Connection closed")]
    Closed,
}

/// Accrued balances recorded by the local ledger.
pub trait LedgerGateway: Send + Sync {
    /// Balance accrued by `address` and the ledger height it was recorded at.
    ///
    /// Returns `(height, amount)`; an unknown address has amount 0.
    fn get_balance_and_height(&self, address: &Address) -> (u64, u64);

    /// Current height of the local chain.
    fn chain_height(&self) -> u64;
}

/// Exit and liquidation policy for registered BLS keys.
pub trait EligibilityGateway: Send + Sync {
    fn is_removable(&self, bls_pubkey: &BlsPublicKey) -> bool;

    fn is_liquidatable(&self, bls_pubkey: &BlsPublicKey) -> bool;
}

/// Source of the peers a round is broadcast to.
pub trait PeerDirectory: Send + Sync {
    /// Every peer currently believed reachable.
    fn reachable_peers(&self) -> Vec<PeerIdentity>;
}

/// The node's own BLS key.
pub trait BlsSigner: Send + Sync {
    fn sign_hash(&self, hash: &MessageHash) -> BlsSignature;

    fn public_key(&self) -> BlsPublicKey;
}

/// Request/reply delivery to one peer.
#[async_trait::async_trait]
pub trait PeerTransport: Send + Sync {
    /// Send `data` to `endpoint` on `peer` and wait for its reply parts.
    ///
    /// # Errors
    /// * `TransportError::Unreachable` - no connection to the peer
    /// * `TransportError::Timeout` - no reply in time
    /// * `TransportError::Closed` - connection dropped mid-request
    async fn request(
        &self,
        peer: &PeerIdentity,
        endpoint: &str,
        data: Vec<u8>,
    ) -> Result<MessageParts, TransportError>;
}
