//! # Service-Node Runtime
//!
//! Loads configuration, initializes telemetry and runs one round of each
//! aggregation kind over a simulated service-node network.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize logging and metrics
//! 3. Validate configuration
//! 4. Build the simulated network and check every node's registration
//! 5. Run reward, exit and liquidation rounds and verify each aggregate

use anyhow::{ensure, Context, Result};
use shared_types::Address;
use sn_bls_aggregator::{AggregateResult, BlsAggregationApi};
use sn_node::{NodeConfig, SimulatedNetwork};
use sn_telemetry::init_telemetry;
use tracing::{info, warn};

/// Recipient funded in every simulated ledger.
const DEMO_RECIPIENT: [u8; 20] = [0x5a; 20];

/// Amount funded to the demo recipient.
const DEMO_AMOUNT: u64 = 1_000_000_000;

fn report(label: &str, result: &AggregateResult) -> Result<()> {
    let verified = result.verify();
    info!(
        round = label,
        contributors = result.contributor_count(),
        message_hash = %hex::encode(result.message_hash),
        signature = %result.signature,
        verified,
        "Aggregate produced"
    );
    ensure!(
        verified || result.signers.is_empty(),
        "{label} aggregate failed verification"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    let _telemetry = init_telemetry(config.telemetry.clone())?;
    config.validate().context("Invalid configuration")?;

    info!("===========================================");
    info!("  Service-Node BLS Aggregation v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let sim = SimulatedNetwork::build(&config).context("Failed to build simulated network")?;

    let operator = Address::new([0x01; 20]);
    let registrations = sim.registrations(operator);
    if registrations.len() != sim.nodes().len() {
        warn!(
            registered = registrations.len(),
            nodes = sim.nodes().len(),
            "Some registrations failed proof-of-possession verification"
        );
    }

    let recipient = Address::new(DEMO_RECIPIENT);
    sim.fund(recipient, config.simulation.chain_height, DEMO_AMOUNT);
    let rewards = sim.aggregator().aggregate_rewards(recipient).await?;
    report("reward", &rewards)?;

    if let Some(target) = sim.nodes().last().map(|node| node.identity.bls_pubkey) {
        sim.approve_exit(target);
        let exit = sim.aggregator().aggregate_exit(target).await?;
        report("exit", &exit)?;

        sim.approve_liquidation(target);
        let liquidation = sim.aggregator().aggregate_liquidation(target).await?;
        report("liquidation", &liquidation)?;
    }

    info!(
        requests = sim.network().requests(),
        peak_in_flight = sim.network().peak_in_flight(),
        "Simulation complete"
    );
    Ok(())
}
