//! Subscriber installation.
//!
//! JSON lines carry `timestamp`, `level`, `target`, `threadId`, the span
//! stack (`claim_submission` with `worker_id`, `facility_id`, `claim_day`,
//! `claim_id`) and event fields, ready for a log shipper.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the event filter from the configured directive.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(format!("'{}': {}", config.log_level, e)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(config.thread_ids);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::Install(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Install(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log a claim-related event with the standard claim fields.
///
/// ```rust,ignore
/// log_claim_event!(info, "Claim submitted", claim.id, claim.worker_id, visits = 2);
/// ```
#[macro_export]
macro_rules! log_claim_event {
    ($level:ident, $msg:expr, $claim_id:expr, $worker_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            claim_id = %$claim_id,
            worker_id = %$worker_id,
            $($($field)*,)?
            $msg
        )
    };
}
