//! Telemetry configuration from file and environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,

    /// `EnvFilter` directive (e.g. `info`, `pl_01_settlement_ledger=debug,info`)
    pub log_level: String,

    /// Emit JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Include thread ids in each line
    pub thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "settlement-ledger".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            thread_ids: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PL_SERVICE_NAME`: Service name (default: settlement-ledger)
    /// - `PL_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `PL_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay environment variables onto an existing configuration.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Overlay values from `lookup`. Unset keys leave the field untouched,
    /// except `PL_JSON_LOGS`, which defaults to on inside containers.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("PL_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Some(level) = lookup("PL_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.log_level = level;
        }
        match lookup("PL_JSON_LOGS") {
            Some(v) => self.json_logs = parse_flag(&v),
            None => {
                let is_container = lookup("KUBERNETES_SERVICE_HOST").is_some()
                    || lookup("DOCKER_CONTAINER").is_some();
                self.json_logs |= is_container;
            }
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
