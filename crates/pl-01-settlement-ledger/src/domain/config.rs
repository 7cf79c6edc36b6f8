//! Ledger configuration with validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settlement ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Total commit attempts when the store reports an optimistic conflict.
    pub max_commit_attempts: u32,
    /// Largest selection accepted in one submission.
    pub max_selected_visits: usize,
    /// Reported GPS accuracy (metres) above which a sign-off location is
    /// not considered verified.
    pub location_accuracy_threshold_m: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: 3,
            max_selected_visits: 100,
            location_accuracy_threshold_m: 100.0,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_commit_attempts == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_commit_attempts cannot be 0".into(),
            ));
        }
        if self.max_selected_visits == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_selected_visits cannot be 0".into(),
            ));
        }
        let threshold = self.location_accuracy_threshold_m;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidLimit(
                "location_accuracy_threshold_m must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}
