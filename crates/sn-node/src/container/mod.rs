//! # Node Container
//!
//! Configuration loading and the simulated service-node network the runtime
//! drives.

pub mod config;
pub mod simulation;

pub use config::{ConfigError, NodeConfig, SimulationConfig};
pub use simulation::{SimulatedAggregator, SimulatedNetwork, SimulatedNode, SimulatedResponder};
