//! PL-02 Claims Gateway - HTTP interface to the settlement ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    CLAIMS GATEWAY (pl-02)                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │   POST /v1/claims/submit   GET /v1/claims/:claimId   /health  │
//! │                          │                                    │
//! │  ┌───────────────────────┴──────────────────────────┐         │
//! │  │  Trace → CORS → Timeout → BodyLimit → Handler    │         │
//! │  └───────────────────────┬──────────────────────────┘         │
//! │                          │  bearer token + decoded body       │
//! │                          ▼                                    │
//! │                 dyn SettlementApi (pl-01)                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers do no business logic: they extract the bearer token, decode
//! the body, call the ledger and map `LedgerError` onto a status code and
//! the `{ success: false, error, ... }` body.
//!
//! # Usage
//!
//! ```ignore
//! use pl_02_claims_gateway::{ClaimsGateway, GatewayConfig};
//!
//! let gateway = ClaimsGateway::new(GatewayConfig::default(), settlement)?;
//! gateway.serve(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::config::{
    ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, TimeoutConfig,
};
pub use domain::error::{ApiError, ErrorBody};
pub use router::{build_router, AppState};
pub use service::{serve_on, ClaimsGateway, GatewayError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
