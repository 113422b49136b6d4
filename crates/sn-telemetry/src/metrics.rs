//! Prometheus metrics for BLS aggregation.
//!
//! All metrics follow the naming convention: `sn_bls_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: rounds started, peer responses, responder replies
//! - **Histogram**: contributors per completed round

use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Aggregation rounds started, by claim kind
    pub static ref AGGREGATION_ROUNDS: IntCounterVec = IntCounterVec::new(
        Opts::new("sn_bls_aggregation_rounds_total", "Total aggregation rounds started"),
        &["kind"]
    ).expect("metric creation failed");

    /// Peer responses seen by the aggregator
    pub static ref PEER_RESPONSES: IntCounterVec = IntCounterVec::new(
        Opts::new("sn_bls_peer_responses_total", "Peer responses processed during aggregation"),
        &["kind", "outcome"]  // outcome: accepted/rejected
    ).expect("metric creation failed");

    /// Contributors per completed round
    pub static ref ROUND_CONTRIBUTORS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sn_bls_round_contributors",
            "Number of peers whose signature was folded into a round's aggregate"
        ).buckets(vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 2000.0])
    ).expect("metric creation failed");

    /// Replies sent by the local responder
    pub static ref RESPONDER_REPLIES: IntCounterVec = IntCounterVec::new(
        Opts::new("sn_bls_responder_replies_total", "Replies sent to signature requests"),
        &["endpoint", "status"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(AGGREGATION_ROUNDS.clone()),
        Box::new(PEER_RESPONSES.clone()),
        Box::new(ROUND_CONTRIBUTORS.clone()),
        Box::new(RESPONDER_REPLIES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
