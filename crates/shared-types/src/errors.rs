//! # Error Types
//!
//! Parse failures for the shared value types.

use thiserror::Error;

/// Errors produced when decoding shared value types from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Claim day is not a real calendar date in `YYYY-MM-DD` form.
    #[error("invalid claim day '{0}': expected YYYY-MM-DD")]
    InvalidClaimDay(String),

    /// Month key is not in `YYYY-MM` form.
    #[error("invalid month key '{0}': expected YYYY-MM")]
    InvalidMonthKey(String),
}
