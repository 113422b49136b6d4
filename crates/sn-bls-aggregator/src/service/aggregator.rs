//! # Aggregation Service
//!
//! The three aggregation entry points. Each validates the caller's own claim,
//! computes the message hash once, broadcasts the claim subject and folds
//! every valid reply into one accumulator.

use parking_lot::Mutex;
use shared_types::{Address, BlsPublicKey, FixedBytes};
use sn_telemetry::{AGGREGATION_ROUNDS, PEER_RESPONSES, ROUND_CONTRIBUTORS};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fanout::FanOutCoordinator;
use super::validator::validate_response;
use crate::domain::accumulator::SignatureAccumulator;
use crate::domain::entities::{AggregateResult, Claim, PeerResponse};
use crate::domain::errors::AggregationError;
use crate::domain::hashing::message_hash;
use crate::domain::tags::{DomainTags, NetworkIdentity};
use crate::domain::value_objects::AggregatorConfig;
use crate::ports::inbound::BlsAggregationApi;
use crate::ports::outbound::{LedgerGateway, PeerDirectory, PeerTransport};

/// Aggregates peer signatures over claims checked against the local ledger.
pub struct BlsAggregationService<L, D, T> {
    ledger: Arc<L>,
    tags: DomainTags,
    fanout: FanOutCoordinator<D, T>,
}

impl<L, D, T> BlsAggregationService<L, D, T>
where
    L: LedgerGateway,
    D: PeerDirectory,
    T: PeerTransport + 'static,
{
    pub fn new(
        network: NetworkIdentity,
        config: AggregatorConfig,
        ledger: Arc<L>,
        directory: Arc<D>,
        transport: Arc<T>,
    ) -> Self {
        Self {
            ledger,
            tags: DomainTags::new(network),
            fanout: FanOutCoordinator::new(directory, transport, config),
        }
    }

    pub fn tags(&self) -> &DomainTags {
        &self.tags
    }

    pub fn config(&self) -> &AggregatorConfig {
        self.fanout.config()
    }

    /// Run one round for an already validated claim.
    async fn aggregate(&self, claim: Claim) -> AggregateResult {
        let kind = claim.kind();
        let endpoint = kind.endpoint();
        let message_hash = message_hash(self.tags.for_kind(kind), &claim);
        AGGREGATION_ROUNDS.with_label_values(&[kind.as_str()]).inc();

        let accumulator = Arc::new(Mutex::new(SignatureAccumulator::new()));
        let on_response = {
            let accumulator = accumulator.clone();
            move |response: PeerResponse| {
                let outcome = validate_response(&claim, &message_hash, &response).and_then(
                    |signature| accumulator.lock().fold(response.peer.bls_pubkey, &signature),
                );

                match outcome {
                    Ok(()) => {
                        PEER_RESPONSES
                            .with_label_values(&[kind.as_str(), "accepted"])
                            .inc();
                        sn_telemetry::log_peer_event!(
                            trace,
                            endpoint,
                            "Accepted peer signature",
                            response.peer.node_pubkey
                        );
                    }
                    Err(rejection) => {
                        PEER_RESPONSES
                            .with_label_values(&[kind.as_str(), "rejected"])
                            .inc();
                        sn_telemetry::log_peer_event!(
                            warn,
                            endpoint,
                            "Rejected peer response",
                            response.peer.node_pubkey,
                            address = %response.peer.address,
                            reason = %rejection
                        );
                    }
                }
            }
        };

        let stats = self
            .fanout
            .broadcast(endpoint, claim.subject_bytes(), on_response)
            .await;

        let (signature, signers) = std::mem::take(&mut *accumulator.lock()).finish();
        let result = AggregateResult {
            claim,
            message_hash,
            signature,
            signers,
        };

        ROUND_CONTRIBUTORS.observe(result.contributor_count() as f64);
        info!(
            endpoint,
            peers = stats.peers,
            contributors = result.contributor_count(),
            "Aggregation round complete"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Some(aggregate_pubkey) = result.aggregate_public_key() {
                debug!(endpoint, %aggregate_pubkey, "Aggregate public key");
            }
        }
        if let Err(err) = result.check_quorum(self.config().min_contributors) {
            warn!(endpoint, error = %err, "Aggregation round below quorum");
        }

        result
    }
}

#[async_trait::async_trait]
impl<L, D, T> BlsAggregationApi for BlsAggregationService<L, D, T>
where
    L: LedgerGateway,
    D: PeerDirectory,
    T: PeerTransport + 'static,
{
    async fn aggregate_rewards(
        &self,
        address: Address,
    ) -> Result<AggregateResult, AggregationError> {
        if address.is_null() {
            return Err(AggregationError::ZeroAddress);
        }

        let (height, amount) = self.ledger.get_balance_and_height(&address);
        if amount == 0 {
            return Err(AggregationError::ZeroAmount { address, height });
        }

        let chain_height = self.ledger.chain_height();
        if height > chain_height {
            return Err(AggregationError::HeightAhead {
                address,
                height,
                chain_height,
            });
        }

        Ok(self
            .aggregate(Claim::RewardBalance {
                address,
                amount,
                height,
            })
            .await)
    }

    async fn aggregate_exit(
        &self,
        bls_pubkey: BlsPublicKey,
    ) -> Result<AggregateResult, AggregationError> {
        if bls_pubkey.is_null() {
            return Err(AggregationError::NullPublicKey);
        }
        Ok(self.aggregate(Claim::Exit { bls_pubkey }).await)
    }

    async fn aggregate_liquidation(
        &self,
        bls_pubkey: BlsPublicKey,
    ) -> Result<AggregateResult, AggregationError> {
        if bls_pubkey.is_null() {
            return Err(AggregationError::NullPublicKey);
        }
        Ok(self.aggregate(Claim::Liquidation { bls_pubkey }).await)
    }
}
