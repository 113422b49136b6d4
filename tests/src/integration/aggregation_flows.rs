//! # Aggregation Flows
//!
//! Full rounds across responders and the aggregation service:
//!
//! 1. **Mixed network**: valid, disagreeing, wrong-key and unreachable peers
//! 2. **Partial signatures**: any subset of contributors re-aggregates and verifies
//! 3. **Duplicates**: one BLS key listed twice contributes once
//! 4. **Admission cap and deadlines**: slow peers are bounded, never waited on forever
//! 5. **Local validation**: bad caller claims never reach the network

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use shared_types::{Address, BlsPublicKey, BlsSignature, NodePubkey};
    use sn_bls_aggregator::wire::error_reply;
    use sn_bls_aggregator::{
        aggregate_bls_signatures, verify_bls, verify_bls_aggregate, AggregationError,
        AggregatorConfig, BlsAggregationApi, BlsAggregationService, BlsResponder, BlsSigner,
        ClaimSubject, InMemoryLedger, InMemoryNetwork, LocalBlsSigner, NetworkIdentity,
        PeerIdentity, Rejection, SignatureResponder, StaticEligibility,
    };

    type Responder = BlsResponder<InMemoryLedger, StaticEligibility, LocalBlsSigner>;
    type Aggregator = BlsAggregationService<InMemoryLedger, InMemoryNetwork, InMemoryNetwork>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const CHAIN_HEIGHT: u64 = 100;
    const REWARD_HEIGHT: u64 = 90;
    const REWARD_AMOUNT: u64 = 5_000;

    fn network_identity() -> NetworkIdentity {
        NetworkIdentity::new(421614, Address::new([0x5f; 20]))
    }

    fn recipient() -> Address {
        Address::new([0xa1; 20])
    }

    /// One service node with its own ledger, policy and key.
    struct TestNode {
        identity: PeerIdentity,
        ledger: Arc<InMemoryLedger>,
        eligibility: Arc<StaticEligibility>,
        responder: Arc<Responder>,
    }

    impl TestNode {
        fn new(index: u8) -> Self {
            Self::on_network(index, network_identity())
        }

        fn on_network(index: u8, network: NetworkIdentity) -> Self {
            let signer = Arc::new(LocalBlsSigner::from_ikm(&[index; 32]).unwrap());
            let ledger = Arc::new(InMemoryLedger::new(CHAIN_HEIGHT));
            let eligibility = Arc::new(StaticEligibility::new());
            let identity = PeerIdentity {
                address: SocketAddr::from(([10, 0, 0, index], 22_000)),
                bls_pubkey: signer.public_key(),
                node_pubkey: NodePubkey::new([index; 32]),
            };
            let responder = Arc::new(BlsResponder::new(
                network,
                ledger.clone(),
                eligibility.clone(),
                signer,
            ));

            Self {
                identity,
                ledger,
                eligibility,
                responder,
            }
        }

        fn funded(index: u8, height: u64, amount: u64) -> Self {
            let node = Self::new(index);
            node.ledger.set_balance(recipient(), height, amount);
            node
        }

        fn join(&self, network: &InMemoryNetwork) {
            network.add_responder(self.identity.clone(), self.responder.clone());
        }

        fn partial_reward_signature(&self) -> BlsSignature {
            self.responder
                .respond(ClaimSubject::RewardBalance(recipient()))
                .unwrap()
                .signature
        }
    }

    fn aggregator(network: Arc<InMemoryNetwork>, config: AggregatorConfig) -> Aggregator {
        let ledger = Arc::new(InMemoryLedger::new(CHAIN_HEIGHT));
        ledger.set_balance(recipient(), REWARD_HEIGHT, REWARD_AMOUNT);
        BlsAggregationService::new(
            network_identity(),
            config,
            ledger,
            network.clone(),
            network,
        )
    }

    fn key_set(keys: &[BlsPublicKey]) -> HashSet<BlsPublicKey> {
        keys.iter().copied().collect()
    }

    // =============================================================================
    // MIXED NETWORK
    // =============================================================================

    #[tokio::test]
    async fn test_reward_round_counts_only_agreeing_peers() {
        let network = Arc::new(InMemoryNetwork::new());
        let agreeing: Vec<TestNode> = (1..=3)
            .map(|i| TestNode::funded(i, REWARD_HEIGHT, REWARD_AMOUNT))
            .collect();
        for node in &agreeing {
            node.join(&network);
        }

        // Its own ledger disagrees on the amount
        let disagreeing = TestNode::funded(4, REWARD_HEIGHT, REWARD_AMOUNT - 1);
        disagreeing.join(&network);

        let unreachable = TestNode::new(5);
        network.add_unreachable(unreachable.identity.clone());

        let service = aggregator(network.clone(), AggregatorConfig::default());
        let result = service.aggregate_rewards(recipient()).await.unwrap();

        assert_eq!(result.contributor_count(), 3);
        assert!(result.verify());
        assert_eq!(
            key_set(&result.signers),
            agreeing.iter().map(|n| n.identity.bls_pubkey).collect()
        );
        assert!(!result.signers.contains(&disagreeing.identity.bls_pubkey));
        assert_eq!(network.requests(), 4);
    }

    #[tokio::test]
    async fn test_stale_height_peer_is_excluded() {
        let network = Arc::new(InMemoryNetwork::new());
        let current = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        let stale = TestNode::funded(2, REWARD_HEIGHT - 10, REWARD_AMOUNT);
        current.join(&network);
        stale.join(&network);

        let result = aggregator(network, AggregatorConfig::default())
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(result.signers, vec![current.identity.bls_pubkey]);
        assert!(result.verify());
    }

    #[tokio::test]
    async fn test_wrong_directory_key_is_rejected() {
        let network = Arc::new(InMemoryNetwork::new());
        let honest = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        honest.join(&network);

        // Directory lists node 7's key but node 6 answers
        let impostor = TestNode::funded(6, REWARD_HEIGHT, REWARD_AMOUNT);
        let listed = TestNode::new(7);
        let identity = PeerIdentity {
            bls_pubkey: listed.identity.bls_pubkey,
            ..impostor.identity.clone()
        };
        network.add_responder(identity, impostor.responder.clone());

        let result = aggregator(network, AggregatorConfig::default())
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(result.signers, vec![honest.identity.bls_pubkey]);
        assert!(result.verify());
    }

    #[tokio::test]
    async fn test_peer_on_other_network_is_rejected() {
        let network = Arc::new(InMemoryNetwork::new());
        let local = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        local.join(&network);

        let foreign = TestNode::on_network(2, NetworkIdentity::new(1, Address::new([0x5f; 20])));
        foreign
            .ledger
            .set_balance(recipient(), REWARD_HEIGHT, REWARD_AMOUNT);
        foreign.join(&network);

        let result = aggregator(network, AggregatorConfig::default())
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(result.signers, vec![local.identity.bls_pubkey]);
    }

    #[tokio::test]
    async fn test_malformed_and_error_replies_are_skipped() {
        let network = Arc::new(InMemoryNetwork::new());
        let honest = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        honest.join(&network);

        let garbage = TestNode::new(2);
        network.add_handler(
            garbage.identity.clone(),
            Arc::new(|_: &str, _: &[Vec<u8>]| vec![b"200".to_vec(), b"not json".to_vec()]),
        );

        let unsorted = TestNode::new(3);
        network.add_handler(
            unsorted.identity.clone(),
            Arc::new(|_: &str, _: &[Vec<u8>]| {
                vec![
                    b"200".to_vec(),
                    br#"{"signature":"0x00","address":"0x00"}"#.to_vec(),
                ]
            }),
        );

        let refusing = TestNode::new(4);
        network.add_handler(
            refusing.identity.clone(),
            Arc::new(|_: &str, _: &[Vec<u8>]| {
                error_reply(&Rejection::BadRequest("Bad request".into()))
            }),
        );

        let result = aggregator(network.clone(), AggregatorConfig::default())
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(result.signers, vec![honest.identity.bls_pubkey]);
        assert!(result.verify());
        assert_eq!(network.requests(), 4);
    }

    // =============================================================================
    // PARTIAL SIGNATURES
    // =============================================================================

    #[tokio::test]
    async fn test_partial_signatures_reaggregate_in_any_subset() {
        let network = Arc::new(InMemoryNetwork::new());
        let nodes: Vec<TestNode> = (1..=3)
            .map(|i| TestNode::funded(i, REWARD_HEIGHT, REWARD_AMOUNT))
            .collect();
        for node in &nodes {
            node.join(&network);
        }
        let outsider = TestNode::funded(4, REWARD_HEIGHT, REWARD_AMOUNT);

        let result = aggregator(network, AggregatorConfig::default())
            .aggregate_rewards(recipient())
            .await
            .unwrap();
        assert_eq!(result.contributor_count(), 3);

        let partials: Vec<(BlsPublicKey, BlsSignature)> = nodes
            .iter()
            .map(|n| (n.identity.bls_pubkey, n.partial_reward_signature()))
            .collect();

        for (key, signature) in &partials {
            assert!(verify_bls(&result.message_hash, signature, key));
        }

        for i in 0..partials.len() {
            for j in (i + 1)..partials.len() {
                let (key_i, sig_i) = partials[i];
                let (key_j, sig_j) = partials[j];
                let pair = aggregate_bls_signatures(&[sig_i, sig_j]).unwrap();
                assert!(verify_bls_aggregate(
                    &result.message_hash,
                    &pair,
                    &[key_i, key_j]
                ));
            }
        }

        let mut with_outsider = result.signers.clone();
        with_outsider.push(outsider.identity.bls_pubkey);
        assert!(!verify_bls_aggregate(
            &result.message_hash,
            &result.signature,
            &with_outsider
        ));
    }

    // =============================================================================
    // DUPLICATES
    // =============================================================================

    #[tokio::test]
    async fn test_key_listed_twice_contributes_once() {
        let network = Arc::new(InMemoryNetwork::new());
        let node = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        node.join(&network);

        let alias = PeerIdentity {
            address: SocketAddr::from(([10, 0, 1, 1], 22_000)),
            ..node.identity.clone()
        };
        network.add_responder(alias, node.responder.clone());

        let result = aggregator(network.clone(), AggregatorConfig::default())
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(network.requests(), 2);
        assert_eq!(result.signers, vec![node.identity.bls_pubkey]);
        assert!(result.verify());
    }

    // =============================================================================
    // EXIT AND LIQUIDATION
    // =============================================================================

    #[tokio::test]
    async fn test_exit_round_counts_approving_peers() {
        let network = Arc::new(InMemoryNetwork::new());
        let nodes: Vec<TestNode> = (1..=3).map(TestNode::new).collect();
        for node in &nodes {
            node.join(&network);
        }
        let target = BlsPublicKey::new([0x42; 96]);
        nodes[0].eligibility.mark_removable(target);
        nodes[1].eligibility.mark_removable(target);

        let service = aggregator(network, AggregatorConfig::default());
        let exit = service.aggregate_exit(target).await.unwrap();

        assert_eq!(
            key_set(&exit.signers),
            key_set(&[nodes[0].identity.bls_pubkey, nodes[1].identity.bls_pubkey])
        );
        assert!(exit.verify());

        let liquidation = service.aggregate_liquidation(target).await.unwrap();
        assert!(liquidation.signers.is_empty());
        assert!(liquidation.signature.is_identity());
        assert!(!liquidation.verify());
    }

    #[tokio::test]
    async fn test_exit_signature_does_not_verify_as_liquidation() {
        let network = Arc::new(InMemoryNetwork::new());
        let node = TestNode::new(1);
        node.join(&network);
        let target = BlsPublicKey::new([0x42; 96]);
        node.eligibility.mark_removable(target);
        node.eligibility.mark_liquidatable(target);

        let service = aggregator(network, AggregatorConfig::default());
        let exit = service.aggregate_exit(target).await.unwrap();
        let liquidation = service.aggregate_liquidation(target).await.unwrap();

        assert!(exit.verify());
        assert!(liquidation.verify());
        assert!(!verify_bls_aggregate(
            &liquidation.message_hash,
            &exit.signature,
            &exit.signers
        ));
    }

    // =============================================================================
    // ADMISSION CAP AND DEADLINES
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_admission_cap_bounds_in_flight_requests() {
        let network = Arc::new(InMemoryNetwork::new().with_latency(Duration::from_millis(20)));
        let nodes: Vec<TestNode> = (1..=12)
            .map(|i| TestNode::funded(i, REWARD_HEIGHT, REWARD_AMOUNT))
            .collect();
        for node in &nodes {
            node.join(&network);
        }

        let config = AggregatorConfig::default().with_max_in_flight(3);
        let result = aggregator(network.clone(), config)
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(result.contributor_count(), 12);
        assert!(result.verify());
        assert_eq!(network.requests(), 12);
        assert!(network.peak_in_flight() <= 3, "peak {}", network.peak_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_deadline_cuts_off_slow_peer() {
        let network = Arc::new(InMemoryNetwork::new());
        let nodes: Vec<TestNode> = (1..=4)
            .map(|i| TestNode::funded(i, REWARD_HEIGHT, REWARD_AMOUNT))
            .collect();
        for node in &nodes {
            node.join(&network);
        }
        let slow = &nodes[3];
        network.set_latency(slow.identity.address, Duration::from_secs(60));

        let config = AggregatorConfig::default()
            .with_peer_timeout(Duration::from_secs(120))
            .with_round_deadline(Some(Duration::from_secs(5)));
        let result = aggregator(network, config)
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(result.contributor_count(), 3);
        assert!(!result.signers.contains(&slow.identity.bls_pubkey));
        assert!(result.verify());
    }

    #[tokio::test(start_paused = true)]
    async fn test_peer_timeout_excludes_slow_peer() {
        let network = Arc::new(InMemoryNetwork::new());
        let nodes: Vec<TestNode> = (1..=3)
            .map(|i| TestNode::funded(i, REWARD_HEIGHT, REWARD_AMOUNT))
            .collect();
        for node in &nodes {
            node.join(&network);
        }
        network.set_latency(nodes[0].identity.address, Duration::from_secs(30));

        let config = AggregatorConfig::default()
            .with_peer_timeout(Duration::from_secs(1))
            .with_round_deadline(None);
        let result = aggregator(network, config)
            .aggregate_rewards(recipient())
            .await
            .unwrap();

        assert_eq!(
            key_set(&result.signers),
            key_set(&[nodes[1].identity.bls_pubkey, nodes[2].identity.bls_pubkey])
        );
    }

    // =============================================================================
    // LOCAL VALIDATION
    // =============================================================================

    #[tokio::test]
    async fn test_invalid_caller_claims_never_reach_the_network() {
        let network = Arc::new(InMemoryNetwork::new());
        let node = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        node.join(&network);

        let ledger = Arc::new(InMemoryLedger::new(CHAIN_HEIGHT));
        ledger.set_balance(recipient(), CHAIN_HEIGHT + 1, REWARD_AMOUNT);
        let service = BlsAggregationService::new(
            network_identity(),
            AggregatorConfig::default(),
            ledger,
            network.clone(),
            network.clone(),
        );

        assert_eq!(
            service.aggregate_rewards(Address::null()).await,
            Err(AggregationError::ZeroAddress)
        );
        assert!(matches!(
            service.aggregate_rewards(Address::new([0x99; 20])).await,
            Err(AggregationError::ZeroAmount { .. })
        ));
        assert!(matches!(
            service.aggregate_rewards(recipient()).await,
            Err(AggregationError::HeightAhead {
                chain_height: CHAIN_HEIGHT,
                ..
            })
        ));
        assert_eq!(
            service.aggregate_exit(BlsPublicKey::null()).await,
            Err(AggregationError::NullPublicKey)
        );
        assert_eq!(
            service.aggregate_liquidation(BlsPublicKey::null()).await,
            Err(AggregationError::NullPublicKey)
        );

        assert_eq!(network.requests(), 0);
    }

    #[tokio::test]
    async fn test_quorum_is_reported_not_enforced() {
        let network = Arc::new(InMemoryNetwork::new());
        let node = TestNode::funded(1, REWARD_HEIGHT, REWARD_AMOUNT);
        node.join(&network);

        let service = aggregator(
            network,
            AggregatorConfig::default().with_min_contributors(2),
        );
        let result = service.aggregate_rewards(recipient()).await.unwrap();

        assert!(result.verify());
        assert_eq!(
            result.check_quorum(service.config().min_contributors),
            Err(AggregationError::InsufficientContributors {
                required: 2,
                actual: 1
            })
        );
    }
}
