//! # Simulated Network
//!
//! N in-process service nodes on one [`InMemoryNetwork`]. Each node owns a
//! ledger, an eligibility policy, a BLS key and a responder; node 0 also runs
//! the aggregation service.

use shared_types::{Address, BlsPublicKey, NodePubkey};
use sn_bls_aggregator::{
    verify_registration, BlsAggregationService, BlsRegistration, BlsResponder, BlsSigner,
    InMemoryLedger, InMemoryNetwork, LocalBlsSigner, PeerIdentity, SignatureError,
    SignatureResponder, StaticEligibility,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use super::config::NodeConfig;

pub type SimulatedResponder = BlsResponder<InMemoryLedger, StaticEligibility, LocalBlsSigner>;
pub type SimulatedAggregator = BlsAggregationService<InMemoryLedger, InMemoryNetwork, InMemoryNetwork>;

/// One in-process service node.
pub struct SimulatedNode {
    pub identity: PeerIdentity,
    pub ledger: Arc<InMemoryLedger>,
    pub eligibility: Arc<StaticEligibility>,
    pub responder: Arc<SimulatedResponder>,
}

/// A network of simulated nodes plus the aggregator run by node 0.
pub struct SimulatedNetwork {
    network: Arc<InMemoryNetwork>,
    nodes: Vec<SimulatedNode>,
    aggregator: SimulatedAggregator,
}

impl SimulatedNetwork {
    /// Build `config.simulation.nodes` nodes with fresh keys.
    pub fn build(config: &NodeConfig) -> Result<Self, SignatureError> {
        let network = Arc::new(InMemoryNetwork::new());
        let mut nodes = Vec::with_capacity(config.simulation.nodes);

        for index in 0..config.simulation.nodes {
            let signer = Arc::new(LocalBlsSigner::random()?);
            let ledger = Arc::new(InMemoryLedger::new(config.simulation.chain_height));
            let eligibility = Arc::new(StaticEligibility::new());

            let port = 22_000u16.wrapping_add(index as u16);
            let mut node_pubkey = [0u8; 32];
            node_pubkey[24..].copy_from_slice(&(index as u64).to_be_bytes());
            let identity = PeerIdentity {
                address: SocketAddr::from(([127, 0, 0, 1], port)),
                bls_pubkey: signer.public_key(),
                node_pubkey: NodePubkey::new(node_pubkey),
            };

            let responder = Arc::new(BlsResponder::new(
                config.network,
                ledger.clone(),
                eligibility.clone(),
                signer,
            ));
            network.add_responder(identity.clone(), responder.clone());

            nodes.push(SimulatedNode {
                identity,
                ledger,
                eligibility,
                responder,
            });
        }

        let local_ledger = nodes
            .first()
            .map(|node| node.ledger.clone())
            .unwrap_or_else(|| Arc::new(InMemoryLedger::new(config.simulation.chain_height)));
        let aggregator = BlsAggregationService::new(
            config.network,
            config.aggregator.clone(),
            local_ledger,
            network.clone(),
            network.clone(),
        );

        info!(
            nodes = nodes.len(),
            chain_id = config.network.chain_id,
            contract = %config.network.contract,
            "Simulated network ready"
        );

        Ok(Self {
            network,
            nodes,
            aggregator,
        })
    }

    pub fn nodes(&self) -> &[SimulatedNode] {
        &self.nodes
    }

    pub fn network(&self) -> &InMemoryNetwork {
        &self.network
    }

    pub fn aggregator(&self) -> &SimulatedAggregator {
        &self.aggregator
    }

    /// Record the same balance in every node's ledger.
    pub fn fund(&self, address: Address, height: u64, amount: u64) {
        for node in &self.nodes {
            node.ledger.set_balance(address, height, amount);
        }
    }

    /// Mark `bls_pubkey` removable on every node.
    pub fn approve_exit(&self, bls_pubkey: BlsPublicKey) {
        for node in &self.nodes {
            node.eligibility.mark_removable(bls_pubkey);
        }
    }

    /// Mark `bls_pubkey` liquidatable on every node.
    pub fn approve_liquidation(&self, bls_pubkey: BlsPublicKey) {
        for node in &self.nodes {
            node.eligibility.mark_liquidatable(bls_pubkey);
        }
    }

    /// Each node's registration, checked against the network's pop tag.
    ///
    /// Returns the registrations that verified.
    pub fn registrations(&self, operator: Address) -> Vec<BlsRegistration> {
        self.nodes
            .iter()
            .map(|node| {
                node.responder
                    .registration(operator, node.identity.node_pubkey)
            })
            .filter(|registration| verify_registration(registration, self.aggregator.tags()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_bls_aggregator::BlsAggregationApi;

    fn config(nodes: usize) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.simulation.nodes = nodes;
        config
    }

    #[tokio::test]
    async fn test_reward_round_over_simulated_network() {
        let sim = SimulatedNetwork::build(&config(4)).unwrap();
        let recipient = Address::new([0x5a; 20]);
        sim.fund(recipient, 90, 12_345);

        let result = sim.aggregator().aggregate_rewards(recipient).await.unwrap();

        assert_eq!(result.contributor_count(), 4);
        assert!(result.verify());
        assert_eq!(sim.network().requests(), 4);
    }

    #[tokio::test]
    async fn test_exit_and_liquidation_rounds() {
        let sim = SimulatedNetwork::build(&config(3)).unwrap();
        let target = sim.nodes()[2].identity.bls_pubkey;

        let refused = sim.aggregator().aggregate_exit(target).await.unwrap();
        assert_eq!(refused.contributor_count(), 0);
        assert!(refused.signature.is_identity());

        sim.approve_exit(target);
        let exit = sim.aggregator().aggregate_exit(target).await.unwrap();
        assert_eq!(exit.contributor_count(), 3);
        assert!(exit.verify());

        sim.approve_liquidation(target);
        let liquidation = sim.aggregator().aggregate_liquidation(target).await.unwrap();
        assert!(liquidation.verify());
        assert_ne!(liquidation.message_hash, exit.message_hash);
    }

    #[test]
    fn test_every_registration_verifies() {
        let sim = SimulatedNetwork::build(&config(3)).unwrap();
        assert_eq!(sim.registrations(Address::new([0x01; 20])).len(), 3);
    }

    #[tokio::test]
    async fn test_empty_network_returns_identity() {
        let sim = SimulatedNetwork::build(&config(0)).unwrap();
        let target = BlsPublicKey::new([0x77; 96]);

        let result = sim.aggregator().aggregate_exit(target).await.unwrap();
        assert!(result.signers.is_empty());
        assert!(result.signature.is_identity());
    }
}
