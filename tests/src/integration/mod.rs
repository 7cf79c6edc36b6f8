//! # Integration Tests
//!
//! Flows that cross the ledger, gateway and runtime crates.

pub mod concurrency;
pub mod http;
pub mod scenarios;
