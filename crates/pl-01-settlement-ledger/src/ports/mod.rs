//! # Ports Layer
//!
//! Defines the port traits for the Settlement Ledger subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API exposed to the gateway)
//! - `outbound.rs` - Driven ports (store, visit source, identity, notifications)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
