//! # Service-Node Telemetry
//!
//! Logging and metrics bootstrap for the BLS aggregation crates.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, console or JSON output
//! - **Metrics**: Prometheus counters and histograms in one global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sn_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SN_SERVICE_NAME` | `sn-bls` | Service name attached to log lines |
//! | `SN_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SN_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `SN_JSON_LOGS` | `false` | JSON formatted logs (default `true` in containers) |
//! | `SN_NETWORK` | `testnet` | Network name attached to log lines |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, AGGREGATION_ROUNDS, PEER_RESPONSES,
    RESPONDER_REPLIES, ROUND_CONTRIBUTORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Log a peer-related event with standard fields.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $endpoint:expr, $msg:expr, $peer:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            endpoint = $endpoint,
            peer = %$peer,
            $($($field)*,)?
            $msg
        )
    };
}
