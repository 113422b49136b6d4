//! # Fan-Out Coordinator
//!
//! Scatter-gather of one request to every reachable peer.
//!
//! - At most `max_in_flight` requests are outstanding; dispatch waits on a
//!   semaphore permit before spawning each request
//! - Each request is bounded by `peer_timeout`
//! - The whole round is bounded by `round_deadline`; when it passes,
//!   outstanding requests are aborted and peers not yet dispatched are skipped
//! - `on_response` runs exactly once per peer; peers cut off by the deadline
//!   are reported as failures
//! - Completions are handed to the blocking pool, so a slow callback (reply
//!   verification) never holds up timers or other peers' requests
//!
//! [`FanOutCoordinator::broadcast`] returns only after every spawned request
//! has finished or been aborted and every handed-off callback has returned.
//! Replies that completed before the deadline still count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use parking_lot::Mutex;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

use crate::domain::entities::{PeerIdentity, PeerResponse};
use crate::domain::value_objects::AggregatorConfig;
use crate::ports::outbound::{PeerDirectory, PeerTransport, TransportError};

/// Per-round dispatch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FanOutStats {
    /// Peers listed by the directory
    pub peers: usize,
    /// Requests actually sent
    pub dispatched: usize,
    /// Requests that returned reply parts
    pub succeeded: usize,
    /// Requests the transport failed
    pub failed: usize,
    /// Requests that exceeded the per-peer timeout
    pub timed_out: usize,
    /// Peers reported as failures without a finished request (round deadline)
    pub cancelled: usize,
}

#[derive(Clone, Copy, Debug)]
enum PeerOutcome {
    Succeeded,
    Failed,
    TimedOut,
}

impl FanOutStats {
    fn record(&mut self, endpoint: &str, joined: Result<PeerOutcome, JoinError>) {
        match joined {
            Ok(PeerOutcome::Succeeded) => self.succeeded += 1,
            Ok(PeerOutcome::Failed) => self.failed += 1,
            Ok(PeerOutcome::TimedOut) => self.timed_out += 1,
            Err(err) if err.is_panic() => warn!(endpoint, "Peer request task panicked"),
            // Aborted at the deadline; reported below as cancelled
            Err(_) => {}
        }
    }
}

/// Broadcasts requests under an admission cap.
pub struct FanOutCoordinator<D, T> {
    directory: Arc<D>,
    transport: Arc<T>,
    config: AggregatorConfig,
}

impl<D, T> FanOutCoordinator<D, T>
where
    D: PeerDirectory,
    T: PeerTransport + 'static,
{
    pub fn new(directory: Arc<D>, transport: Arc<T>, config: AggregatorConfig) -> Self {
        Self {
            directory,
            transport,
            config,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Send `data` to `endpoint` on every reachable peer.
    ///
    /// `on_response` runs on the blocking pool for peers that completed and
    /// may run concurrently for different peers.
    pub async fn broadcast<F>(&self, endpoint: &str, data: Vec<u8>, on_response: F) -> FanOutStats
    where
        F: Fn(PeerResponse) + Send + Sync + 'static,
    {
        let peers = self.directory.reachable_peers();
        let mut stats = FanOutStats {
            peers: peers.len(),
            ..FanOutStats::default()
        };
        if peers.is_empty() {
            return stats;
        }

        let on_response = Arc::new(on_response);
        let reported: Arc<Vec<AtomicBool>> =
            Arc::new(peers.iter().map(|_| AtomicBool::new(false)).collect());
        let callbacks: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.config.effective_max_in_flight()));
        let endpoint: Arc<str> = Arc::from(endpoint);
        let mut tasks = JoinSet::new();

        let round = async {
            for (index, peer) in peers.iter().enumerate() {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };

                let peer = peer.clone();
                let transport = self.transport.clone();
                let endpoint = endpoint.clone();
                let data = data.clone();
                let on_response = on_response.clone();
                let reported = reported.clone();
                let callbacks = callbacks.clone();
                let peer_timeout = self.config.peer_timeout;

                tasks.spawn(async move {
                    let result = timeout(peer_timeout, transport.request(&peer, &endpoint, data)).await;
                    drop(permit);

                    let (response, outcome) = match result {
                        Ok(Ok(parts)) => (PeerResponse::success(peer, parts), PeerOutcome::Succeeded),
                        Ok(Err(err)) => {
                            log_transport_failure(&endpoint, &peer, &err);
                            (PeerResponse::failure(peer), PeerOutcome::Failed)
                        }
                        Err(_) => {
                            log_transport_failure(&endpoint, &peer, &TransportError::Timeout);
                            (PeerResponse::failure(peer), PeerOutcome::TimedOut)
                        }
                    };

                    if !reported[index].swap(true, Ordering::AcqRel) {
                        let handle = tokio::task::spawn_blocking(move || on_response(response));
                        callbacks.lock().push(handle);
                    }
                    outcome
                });
                stats.dispatched += 1;
            }

            while let Some(joined) = tasks.join_next().await {
                stats.record(&endpoint, joined);
            }
        };

        let completed = match self.config.round_deadline {
            Some(deadline) => timeout_at(Instant::now() + deadline, round).await.is_ok(),
            None => {
                round.await;
                true
            }
        };

        if !completed {
            warn!(
                endpoint = %endpoint,
                outstanding = tasks.len(),
                "Round deadline reached, cancelling outstanding requests"
            );
            tasks.abort_all();
            while let Some(joined) = tasks.join_next().await {
                stats.record(&endpoint, joined);
            }
        }

        // No request task is left to hand off further callbacks
        let handed_off = std::mem::take(&mut *callbacks.lock());
        for handle in handed_off {
            if let Err(err) = handle.await {
                warn!(endpoint = %endpoint, error = %err, "Peer response callback failed");
            }
        }

        for (peer, flag) in peers.into_iter().zip(reported.iter()) {
            if !flag.swap(true, Ordering::AcqRel) {
                stats.cancelled += 1;
                on_response(PeerResponse::failure(peer));
            }
        }

        debug!(endpoint = %endpoint, ?stats, "Fan-out complete");
        stats
    }
}

fn log_transport_failure(endpoint: &str, peer: &PeerIdentity, err: &TransportError) {
    debug!(
        endpoint,
        peer = %peer.node_pubkey,
        address = %peer.address,
        error = %err,
        "Peer request failed"
    );
}
