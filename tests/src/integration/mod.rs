//! # Integration Tests
//!
//! Aggregation rounds driven end to end: real responders with their own
//! ledgers and keys, the in-memory transport between them, and the
//! aggregation service on top.

pub mod aggregation_flows;
