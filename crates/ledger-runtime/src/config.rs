//! # Runtime Configuration
//!
//! One TOML document with a section per crate:
//!
//! ```toml
//! [telemetry]
//! log_level = "info"
//!
//! [ledger]
//! max_commit_attempts = 3
//!
//! [gateway.http]
//! port = 8080
//!
//! [[gateway.tokens]]
//! token = "..."
//! worker_id = "w-1"
//! display_name = "Sam Worker"
//!
//! [storage]
//! backend = "rocksdb"
//! data_dir = "/var/lib/settlement-ledger"
//!
//! [visits]
//! import_file = "/var/lib/settlement-ledger/drafts.json"
//! ```
//!
//! Every field has a default. Environment variables override the file.

use ledger_telemetry::TelemetryConfig;
use pl_01_settlement_ledger::LedgerConfig;
use pl_02_claims_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "PL_CONFIG";

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub telemetry: TelemetryConfig,
    pub ledger: LedgerConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub visits: VisitsConfig,
}

/// Which `LedgerStore` implementation backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local; lost on restart.
    #[default]
    Memory,
    /// RocksDB optimistic-transaction database under `data_dir`.
    Rocksdb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Rocksdb => write!(f, "rocksdb"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "rocksdb" | "rocks" => Ok(StorageBackend::Rocksdb),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Data directory for the RocksDB backend.
    pub data_dir: PathBuf,
    /// fsync every commit.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data/ledger"),
            sync_writes: true,
        }
    }
}

/// Where draft visits come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitsConfig {
    /// JSON array of draft visits loaded at startup.
    pub import_file: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {key} ('{value}'): {reason}")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("ledger: {0}")]
    Ledger(#[from] pl_01_settlement_ledger::ConfigError),

    #[error("gateway: {0}")]
    Gateway(#[from] pl_02_claims_gateway::ConfigError),

    #[error("storage: {0}")]
    Storage(String),

    #[error("visits: {0}")]
    Visits(String),
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// File named by `PL_CONFIG` (defaults when unset), then environment
    /// overrides, then validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |key: &str| env::var(key).ok();
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PL_*` overrides from `lookup`.
    ///
    /// - `PL_HTTP_PORT`: gateway port
    /// - `PL_STORAGE`: `memory` or `rocksdb`
    /// - `PL_DATA_DIR`: RocksDB data directory
    /// - `PL_VISIT_IMPORT`: draft visit import file
    /// - telemetry keys, see `TelemetryConfig::apply_overrides`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PL_HTTP_PORT") {
            self.gateway.http.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    key: "PL_HTTP_PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(backend) = lookup("PL_STORAGE") {
            self.storage.backend = backend.parse().map_err(|reason| ConfigError::Env {
                key: "PL_STORAGE",
                value: backend.clone(),
                reason,
            })?;
        }
        if let Some(dir) = lookup("PL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("PL_VISIT_IMPORT") {
            self.visits.import_file = Some(PathBuf::from(file));
        }
        self.telemetry.apply_overrides(&lookup);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger.validate()?;
        self.gateway.validate()?;

        if self.storage.backend == StorageBackend::Rocksdb {
            if !cfg!(feature = "rocksdb") {
                return Err(ConfigError::Storage(
                    "rocksdb backend selected but this build lacks the `rocksdb` feature".into(),
                ));
            }
            if self.storage.data_dir.as_os_str().is_empty() {
                return Err(ConfigError::Storage("data_dir cannot be empty".into()));
            }
        }
        if let Some(file) = &self.visits.import_file {
            if file.as_os_str().is_empty() {
                return Err(ConfigError::Visits("import_file cannot be empty".into()));
            }
        }
        Ok(())
    }
}
