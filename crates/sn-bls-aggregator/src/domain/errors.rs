//! # Error Types
//!
//! One enum per failure class:
//!
//! - [`AggregationError`]: the caller's own claim is unusable; fatal to the call
//! - [`Rejection`]: a responder refuses a request; becomes a `400`/`403` reply
//! - [`ResponseRejection`]: one peer's reply is discarded; never fatal
//! - [`SignatureError`]: BLS encoding or aggregation failures

use shared_types::{Address, BlsPublicKey};
use thiserror::Error;

/// BLS primitive failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature or key encoding is invalid
    #[error("Invalid BLS encoding")]
    InvalidFormat,

    /// Cannot aggregate an empty list
    #[error("Cannot aggregate empty list")]
    EmptyAggregation,

    /// Point addition or group check failed
    #[error("BLS aggregation failed")]
    BlsPairingFailed,

    /// Secret key derivation failed (key material too short)
    #[error("BLS key generation failed")]
    KeyGeneration,
}

/// Local precondition failures on the caller's own claim.
///
/// These are raised before anything is sent to the network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Aggregating a rewards request for the zero address is invalid. Request rejected")]
    ZeroAddress,

    #[error("Aggregating a rewards request for '{address}' for 0 at height {height} is invalid because no rewards are available. Request rejected")]
    ZeroAmount { address: Address, height: u64 },

    #[error("Aggregating a rewards request for '{address}' at height {height} is invalid because the height is greater than the blockchain height {chain_height}. Request rejected")]
    HeightAhead {
        address: Address,
        height: u64,
        chain_height: u64,
    },

    #[error("Aggregating a request for the null BLS pubkey is invalid. Request rejected")]
    NullPublicKey,

    #[error("Insufficient contributors: required {required}, got {actual}")]
    InsufficientContributors { required: usize, actual: usize },
}

/// Reasons a responder refuses to sign.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Address {address} has a zero balance in the database")]
    ZeroBalance { address: Address },

    #[error("Address {address} balance height {height} is ahead of the blockchain height {chain_height}")]
    HeightAhead {
        address: Address,
        height: u64,
        chain_height: u64,
    },

    #[error("Forbidden: The BLS pubkey {bls_pubkey} is not currently removable.")]
    NotRemovable { bls_pubkey: BlsPublicKey },

    #[error("Forbidden: The BLS key {bls_pubkey} is not currently liquidatable")]
    NotLiquidatable { bls_pubkey: BlsPublicKey },

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Rejection {
    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::ZeroBalance { .. } => "zero_balance",
            Rejection::HeightAhead { .. } => "height_ahead",
            Rejection::NotRemovable { .. } => "not_removable",
            Rejection::NotLiquidatable { .. } => "not_liquidatable",
            Rejection::BadRequest(_) => "bad_request",
            Rejection::Internal(_) => "internal",
        }
    }

    /// Wire status code for the reply.
    pub fn status(&self) -> &'static str {
        match self {
            Rejection::ZeroBalance { .. }
            | Rejection::HeightAhead { .. }
            | Rejection::NotRemovable { .. }
            | Rejection::NotLiquidatable { .. } => "403",
            Rejection::BadRequest(_) => "400",
            Rejection::Internal(_) => "500",
        }
    }
}

/// Why one peer's reply did not contribute to the aggregate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponseRejection {
    #[error("Request failed or peer unreachable")]
    TransportFailure,

    #[error("Request returned an error: {0}")]
    ErrorStatus(String),

    #[error("Malformed reply: {0}")]
    Malformed(String),

    #[error("Claim subject does not match the request")]
    SubjectMismatch,

    #[error("Balance/height mismatch: expected {expected_amount}/{expected_height}, got {amount}/{height}")]
    ClaimMismatch {
        expected_amount: u64,
        expected_height: u64,
        amount: u64,
        height: u64,
    },

    #[error("Invalid BLS signature for BLS pubkey {bls_pubkey}")]
    InvalidSignature { bls_pubkey: BlsPublicKey },

    #[error("Duplicate contribution from BLS pubkey {bls_pubkey}")]
    DuplicateContributor { bls_pubkey: BlsPublicKey },
}
