//! Value objects for aggregation configuration.

use std::time::Duration;
use tokio::sync::Semaphore;

/// Aggregation round configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Maximum number of peer requests in flight at once
    pub max_in_flight: usize,
    /// Deadline for a single peer's reply
    pub peer_timeout: Duration,
    /// Deadline for the whole fan-out; outstanding requests are cancelled
    pub round_deadline: Option<Duration>,
    /// Contributors below which a round is logged as lacking quorum
    pub min_contributors: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 900,
            peer_timeout: Duration::from_secs(10),
            round_deadline: Some(Duration::from_secs(30)),
            min_contributors: 0,
        }
    }
}

impl AggregatorConfig {
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_peer_timeout(mut self, peer_timeout: Duration) -> Self {
        self.peer_timeout = peer_timeout;
        self
    }

    pub fn with_round_deadline(mut self, round_deadline: Option<Duration>) -> Self {
        self.round_deadline = round_deadline;
        self
    }

    pub fn with_min_contributors(mut self, min_contributors: usize) -> Self {
        self.min_contributors = min_contributors;
        self
    }

    /// Admission cap actually used.
    ///
    /// Zero would never dispatch; anything above the semaphore's permit limit
    /// behaves the same as that limit.
    pub fn effective_max_in_flight(&self) -> usize {
        self.max_in_flight.clamp(1, Semaphore::MAX_PERMITS)
    }
}
