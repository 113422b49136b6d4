//! # Service-Node Runtime Library
//!
//! Exposes the runtime's configuration and simulated network for testing.
//! The main entry point is the `main.rs` binary.

pub mod container;

pub use container::{ConfigError, NodeConfig, SimulatedNetwork, SimulationConfig};
