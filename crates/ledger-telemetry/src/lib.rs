//! # Ledger Telemetry
//!
//! Structured logging for the settlement ledger services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PL_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `PL_JSON_LOGS` | `false` (`true` in containers) | JSON line output |
//! | `PL_SERVICE_NAME` | `settlement-ledger` | Service name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter {0}")]
    Filter(String),

    #[error("failed to install subscriber: {0}")]
    Install(String),
}
