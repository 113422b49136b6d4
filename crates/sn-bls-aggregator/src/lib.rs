//! # Service-Node BLS Aggregation
//!
//! Produces network-wide BLS aggregate signatures attesting to a claim about
//! one address or key: a reward balance, an exit approval or a liquidation
//! approval.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): tags, claim hashing, BLS primitives, the accumulator
//! - **Ports Layer** (`ports/`): trait definitions for inbound/outbound interfaces
//! - **Wire Layer** (`wire/`): request decoding and sorted-key reply bodies
//! - **Service Layer** (`service/`): fan-out, validation, aggregation and the responder
//! - **Adapters** (`adapters/`): local signer and in-memory collaborators
//!
//! ## Round
//!
//! ```text
//! caller ─→ message_hash ─→ broadcast ─→ peer responders ─→ validate ─→ fold ─→ AggregateResult
//! ```
//!
//! ## Security Notes
//!
//! - Every signed hash is bound to the claim kind and the network through its domain tag
//! - Replies are checked against the caller's own claim; the hash is always recomputed locally
//! - A peer contributes at most once per round
//! - Same-message aggregation assumes keys registered with proof of possession

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod wire;

// Re-export public API
pub use adapters::{InMemoryLedger, InMemoryNetwork, LocalBlsSigner, StaticEligibility};
pub use domain::bls::{
    aggregate_bls_public_keys, aggregate_bls_signatures, verify_bls, verify_bls_aggregate,
};
pub use domain::entities::{
    AggregateResult, BlsRegistration, Claim, ClaimKind, ClaimSubject, MessageHash, MessageParts,
    PeerIdentity, PeerResponse, SignedReply,
};
pub use domain::errors::{AggregationError, Rejection, ResponseRejection, SignatureError};
pub use domain::hashing::message_hash;
pub use domain::registration::{pop_hash, verify_registration};
pub use domain::tags::{build_pop_tag, build_tag, DomainTag, DomainTags, NetworkIdentity};
pub use domain::value_objects::AggregatorConfig;
pub use ports::inbound::{BlsAggregationApi, SignatureResponder};
pub use ports::outbound::{
    BlsSigner, EligibilityGateway, LedgerGateway, PeerDirectory, PeerTransport, TransportError,
};
pub use service::{BlsAggregationService, BlsResponder, FanOutCoordinator, FanOutStats};
