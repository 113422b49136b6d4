//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.

pub mod memory;
pub mod signer;

pub use memory::{InMemoryLedger, InMemoryNetwork, RequestHandler, StaticEligibility};
pub use signer::LocalBlsSigner;
