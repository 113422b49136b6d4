//! # In-Memory Adapters
//!
//! Ledger, eligibility and network collaborators backed by process memory.
//! Used by the simulated runtime and by tests.
//!
//! [`InMemoryNetwork`] is both the peer directory and the transport: each
//! registered peer is served by a request handler, usually a
//! [`SignatureResponder`]. Peers listed without a handler are unreachable.

use parking_lot::RwLock;
use shared_types::{Address, BlsPublicKey};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{MessageParts, PeerIdentity};
use crate::ports::inbound::SignatureResponder;
use crate::ports::outbound::{
    EligibilityGateway, LedgerGateway, PeerDirectory, PeerTransport, TransportError,
};

/// Ledger of accrued balances keyed by address.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<Address, (u64, u64)>>,
    chain_height: AtomicU64,
}

impl InMemoryLedger {
    pub fn new(chain_height: u64) -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            chain_height: AtomicU64::new(chain_height),
        }
    }

    /// Record `amount` accrued to `address` as of `height`.
    pub fn set_balance(&self, address: Address, height: u64, amount: u64) {
        self.balances.write().insert(address, (height, amount));
    }

    pub fn set_chain_height(&self, height: u64) {
        self.chain_height.store(height, Ordering::SeqCst);
    }
}

impl LedgerGateway for InMemoryLedger {
    fn get_balance_and_height(&self, address: &Address) -> (u64, u64) {
        self.balances
            .read()
            .get(address)
            .copied()
            .unwrap_or((self.chain_height(), 0))
    }

    fn chain_height(&self) -> u64 {
        self.chain_height.load(Ordering::SeqCst)
    }
}

/// Fixed sets of removable and liquidatable keys.
#[derive(Debug, Default)]
pub struct StaticEligibility {
    removable: RwLock<HashSet<BlsPublicKey>>,
    liquidatable: RwLock<HashSet<BlsPublicKey>>,
}

impl StaticEligibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_removable(&self, bls_pubkey: BlsPublicKey) {
        self.removable.write().insert(bls_pubkey);
    }

    pub fn mark_liquidatable(&self, bls_pubkey: BlsPublicKey) {
        self.liquidatable.write().insert(bls_pubkey);
    }
}

impl EligibilityGateway for StaticEligibility {
    fn is_removable(&self, bls_pubkey: &BlsPublicKey) -> bool {
        self.removable.read().contains(bls_pubkey)
    }

    fn is_liquidatable(&self, bls_pubkey: &BlsPublicKey) -> bool {
        self.liquidatable.read().contains(bls_pubkey)
    }
}

/// Serves one peer's requests: `(endpoint, parts) -> reply parts`.
pub type RequestHandler = Arc<dyn Fn(&str, &[Vec<u8>]) -> MessageParts + Send + Sync>;

/// Decrements the in-flight counter when a request ends, cancelled or not.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Loopback network of in-process peers.
#[derive(Default)]
pub struct InMemoryNetwork {
    peers: RwLock<Vec<PeerIdentity>>,
    handlers: RwLock<HashMap<SocketAddr, RequestHandler>>,
    latency: RwLock<HashMap<SocketAddr, Duration>>,
    default_latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requests: AtomicUsize,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request waits `latency` before it is served.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.default_latency = latency;
        self
    }

    /// Add a peer served by `responder`.
    pub fn add_responder<R>(&self, peer: PeerIdentity, responder: Arc<R>)
    where
        R: SignatureResponder + 'static,
    {
        self.add_handler(
            peer,
            Arc::new(move |endpoint: &str, parts: &[Vec<u8>]| responder.handle(endpoint, parts)),
        );
    }

    /// Add a peer served by an arbitrary handler.
    pub fn add_handler(&self, peer: PeerIdentity, handler: RequestHandler) {
        self.handlers.write().insert(peer.address, handler);
        self.peers.write().push(peer);
    }

    /// List a peer that never answers a connection.
    pub fn add_unreachable(&self, peer: PeerIdentity) {
        self.peers.write().push(peer);
    }

    /// Override the latency of a single peer.
    pub fn set_latency(&self, address: SocketAddr, latency: Duration) {
        self.latency.write().insert(address, latency);
    }

    /// Highest number of requests observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Requests delivered to a handler so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PeerDirectory for InMemoryNetwork {
    fn reachable_peers(&self) -> Vec<PeerIdentity> {
        self.peers.read().clone()
    }
}

#[async_trait::async_trait]
impl PeerTransport for InMemoryNetwork {
    async fn request(
        &self,
        peer: &PeerIdentity,
        endpoint: &str,
        data: Vec<u8>,
    ) -> Result<MessageParts, TransportError> {
        let handler = self.handlers.read().get(&peer.address).cloned();
        let Some(handler) = handler else {
            return Err(TransportError::Unreachable(peer.address.to_string()));
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = self
            .latency
            .read()
            .get(&peer.address)
            .copied()
            .unwrap_or(self.default_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(handler(endpoint, &[data]))
    }
}
