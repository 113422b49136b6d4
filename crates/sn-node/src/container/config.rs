//! # Node Configuration
//!
//! Network identity, aggregation limits, telemetry and simulation settings.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SN_CHAIN_ID` | `421614` | Chain id bound into every domain tag |
//! | `SN_CONTRACT_ADDRESS` | devnet contract | Contract bound into every domain tag |
//! | `SN_MAX_IN_FLIGHT` | `900` | Admission cap for peer requests |
//! | `SN_PEER_TIMEOUT_MS` | `10000` | Per-peer request timeout |
//! | `SN_ROUND_DEADLINE_MS` | `30000` | Round deadline; `0` disables it |
//! | `SN_MIN_CONTRIBUTORS` | `0` | Contributors below which a round lacks quorum |
//! | `SN_SIM_NODES` | `5` | Nodes in the simulated network |

use shared_types::{Address, FixedBytes};
use sn_bls_aggregator::{AggregatorConfig, NetworkIdentity};
use sn_telemetry::TelemetryConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// First contract address deployed by a fresh local devnet account.
const DEVNET_CONTRACT: [u8; 20] = [
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64, 0x2f,
    0x64, 0x18, 0x0a, 0xa3,
];

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Admission cap must be at least 1")]
    ZeroMaxInFlight,

    #[error("Peer timeout must be non-zero")]
    ZeroPeerTimeout,

    #[error("Contract address must not be the zero address. Set SN_CONTRACT_ADDRESS")]
    NullContract,
}

/// Simulated network settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of in-process service nodes
    pub nodes: usize,
    /// Chain height every simulated ledger starts at
    pub chain_height: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nodes: 5,
            chain_height: 100,
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Network identity bound into domain tags.
    pub network: NetworkIdentity,
    /// Aggregation round limits.
    pub aggregator: AggregatorConfig,
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
    /// Simulated network.
    pub simulation: SimulationConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkIdentity::new(421614, Address::new(DEVNET_CONTRACT)),
            aggregator: AggregatorConfig::default(),
            telemetry: TelemetryConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl NodeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|var| std::env::var(var).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Load configuration from `lookup`, falling back to defaults for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("SN_CHAIN_ID") {
            config.network.chain_id = parse("SN_CHAIN_ID", &value)?;
        }
        if let Some(value) = lookup("SN_CONTRACT_ADDRESS") {
            config.network.contract =
                Address::from_hex(value.trim()).map_err(|e| ConfigError::InvalidValue {
                    var: "SN_CONTRACT_ADDRESS",
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(value) = lookup("SN_MAX_IN_FLIGHT") {
            config.aggregator.max_in_flight = parse("SN_MAX_IN_FLIGHT", &value)?;
        }
        if let Some(value) = lookup("SN_PEER_TIMEOUT_MS") {
            config.aggregator.peer_timeout =
                Duration::from_millis(parse("SN_PEER_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = lookup("SN_ROUND_DEADLINE_MS") {
            let millis: u64 = parse("SN_ROUND_DEADLINE_MS", &value)?;
            config.aggregator.round_deadline = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(value) = lookup("SN_MIN_CONTRIBUTORS") {
            config.aggregator.min_contributors = parse("SN_MIN_CONTRIBUTORS", &value)?;
        }
        if let Some(value) = lookup("SN_SIM_NODES") {
            config.simulation.nodes = parse("SN_SIM_NODES", &value)?;
        }

        Ok(config)
    }

    /// Reject settings that would make every round fail or sign for no contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregator.max_in_flight == 0 {
            return Err(ConfigError::ZeroMaxInFlight);
        }
        if self.aggregator.peer_timeout.is_zero() {
            return Err(ConfigError::ZeroPeerTimeout);
        }
        if self.network.contract.is_null() {
            return Err(ConfigError::NullContract);
        }
        Ok(())
    }
}
