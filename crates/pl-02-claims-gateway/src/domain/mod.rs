//! Gateway domain: configuration and the HTTP error shape.

pub mod config;
pub mod error;

pub use config::*;
pub use error::*;
