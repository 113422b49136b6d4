//! # Service Layer
//!
//! Wires the domain logic to the ports: the fan-out coordinator, response
//! validation, the aggregation entry points and the per-node responder.

pub mod aggregator;
pub mod fanout;
pub mod responder;
pub mod validator;

pub use aggregator::BlsAggregationService;
pub use fanout::{FanOutCoordinator, FanOutStats};
pub use responder::BlsResponder;
pub use validator::validate_response;
